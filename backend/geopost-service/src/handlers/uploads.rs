/// Serves stored uploads under `/uploads/<file>`
use crate::config::UploadConfig;
use crate::error::{AppError, Result};
use actix_web::{http::header, web, HttpResponse};
use futures_util::stream::{self, Stream};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

const CHUNK_SIZE: usize = 64 * 1024;

/// GET /uploads/{file_name}
pub async fn serve_upload(
    upload_cfg: web::Data<UploadConfig>,
    file_name: web::Path<String>,
) -> Result<HttpResponse> {
    let file_name = file_name.into_inner();
    if !is_plain_file_name(&file_name) {
        return Err(AppError::NotFound(file_name));
    }

    let path = upload_cfg.dir.join(&file_name);
    let file = match File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(file_name))
        }
        Err(e) => return Err(e.into()),
    };
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(AppError::NotFound(file_name));
    }

    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&file_name))
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .no_chunking(metadata.len())
        .streaming(file_chunks(file)))
}

/// Read `file` in fixed-size chunks until EOF
fn file_chunks(file: File) -> impl Stream<Item = std::io::Result<web::Bytes>> {
    stream::try_unfold(file, |mut file| async move {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let read = file.read(&mut buf).await?;
        if read == 0 {
            return Ok(None);
        }
        buf.truncate(read);
        Ok(Some((web::Bytes::from(buf), file)))
    })
}

/// Stored names never contain separators and never start with a dot.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && !name.contains(['/', '\\'])
}

fn content_type_for(file_name: &str) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => mime::IMAGE_JPEG.to_string(),
        "png" => mime::IMAGE_PNG.to_string(),
        "gif" => mime::IMAGE_GIF.to_string(),
        "webp" => "image/webp".to_string(),
        "heic" => "image/heic".to_string(),
        "glb" => "model/gltf-binary".to_string(),
        "gltf" => "model/gltf+json".to_string(),
        "usdz" => "model/vnd.usdz+zip".to_string(),
        "txt" => mime::TEXT_PLAIN_UTF_8.to_string(),
        _ => mime::APPLICATION_OCTET_STREAM.to_string(),
    }
}
