//! Proximity ranking pipeline
//!
//! bbox pre-filter -> storage candidates -> exact distance -> radius filter ->
//! ascending sort -> limit.

use crate::bbox::{compute_bounding_box, BoundingBox};
use crate::distance::haversine_meters;
use crate::error::{GeoError, GeoResult};
use crate::point::GeoPoint;
use crate::{MAX_CANDIDATES, MAX_LIMIT};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashSet;
use std::hash::Hash;
use tracing::debug;

/// A stored record the engine can place on the map.
pub trait GeoRecord {
    type Id: Eq + Hash;
    type Recency: Ord;

    fn id(&self) -> Self::Id;

    fn location(&self) -> GeoPoint;

    /// Larger values are newer
    fn recency(&self) -> Self::Recency;
}

/// Storage collaborator returning the records inside a bounding box.
///
/// Implementations return at most `cap` rows, newest first, and report any
/// failure as [`GeoError::StorageUnavailable`].
#[async_trait]
pub trait CandidateSource: Send + Sync {
    type Record: GeoRecord + Send;

    async fn candidates_in_box(
        &self,
        bbox: &BoundingBox,
        cap: usize,
    ) -> GeoResult<Vec<Self::Record>>;
}

/// A record paired with its distance from the query center.
///
/// Serializes as the record's own fields plus `distance`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceAnnotated<T> {
    #[serde(flatten)]
    pub record: T,
    /// Meters from the query center
    pub distance: f64,
}

/// A validated point + radius query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityQuery {
    center: GeoPoint,
    radius_m: f64,
    limit: usize,
}

impl ProximityQuery {
    /// Validate inputs and clamp `limit` to [`MAX_LIMIT`].
    pub fn new(center: GeoPoint, radius_m: f64, limit: i64) -> GeoResult<Self> {
        center.validate()?;
        if !radius_m.is_finite() || radius_m <= 0.0 {
            return Err(GeoError::invalid("radius must be a positive number"));
        }
        let limit = clamp_limit(limit)?;

        Ok(Self {
            center,
            radius_m,
            limit,
        })
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn bounding_box(&self) -> BoundingBox {
        compute_bounding_box(self.center, self.radius_m)
    }
}

/// Reject non-positive limits and cap the rest at [`MAX_LIMIT`].
pub fn clamp_limit(limit: i64) -> GeoResult<usize> {
    if limit <= 0 {
        return Err(GeoError::invalid("limit must be a positive integer"));
    }
    Ok(usize::try_from(limit).unwrap_or(MAX_LIMIT).min(MAX_LIMIT))
}

/// Annotate, filter, sort and truncate an already-fetched candidate set.
///
/// The sort is stable, so equal distances keep the candidates' input order.
/// Candidates whose distance is NaN never pass the radius filter.
pub fn rank_candidates<T: GeoRecord>(
    query: &ProximityQuery,
    candidates: Vec<T>,
) -> Vec<DistanceAnnotated<T>> {
    let center = query.center();
    let mut ranked: Vec<DistanceAnnotated<T>> = candidates
        .into_iter()
        .map(|record| {
            let distance = haversine_meters(center, record.location());
            DistanceAnnotated { record, distance }
        })
        .filter(|item| item.distance <= query.radius_m())
        .collect();

    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked.truncate(query.limit());
    ranked
}

/// Merge candidate batches from split boxes: de-duplicate by id, newest first,
/// at most `cap` rows.
pub fn merge_newest_first<T: GeoRecord>(batches: Vec<Vec<T>>, cap: usize) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut merged: Vec<T> = batches
        .into_iter()
        .flatten()
        .filter(|record| seen.insert(record.id()))
        .collect();

    merged.sort_by(|a, b| b.recency().cmp(&a.recency()));
    merged.truncate(cap);
    merged
}

/// Run the full proximity pipeline against `source`.
///
/// A storage failure aborts the query; no partial result is returned.
pub async fn find_near<S>(
    query: &ProximityQuery,
    source: &S,
) -> GeoResult<Vec<DistanceAnnotated<S::Record>>>
where
    S: CandidateSource + ?Sized,
{
    let boxes = query.bounding_box().split_antimeridian();

    let candidates = if boxes.len() == 1 {
        source.candidates_in_box(&boxes[0], MAX_CANDIDATES).await?
    } else {
        let mut batches = Vec::with_capacity(boxes.len());
        for bbox in &boxes {
            batches.push(source.candidates_in_box(bbox, MAX_CANDIDATES).await?);
        }
        merge_newest_first(batches, MAX_CANDIDATES)
    };

    let candidate_count = candidates.len();
    let ranked = rank_candidates(query, candidates);

    debug!(
        lat = query.center().lat,
        lng = query.center().lng,
        radius_m = query.radius_m(),
        boxes = boxes.len(),
        candidates = candidate_count,
        results = ranked.len(),
        "proximity query ranked"
    );

    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Pin {
        id: u32,
        at: GeoPoint,
        created: u64,
    }

    impl GeoRecord for Pin {
        type Id = u32;
        type Recency = u64;

        fn id(&self) -> u32 {
            self.id
        }

        fn location(&self) -> GeoPoint {
            self.at
        }

        fn recency(&self) -> u64 {
            self.created
        }
    }

    fn pin(id: u32, lat: f64, lng: f64) -> Pin {
        Pin {
            id,
            at: GeoPoint::new(lat, lng),
            created: id as u64,
        }
    }

    #[test]
    fn test_query_rejects_bad_radius() {
        let center = GeoPoint::new(0.0, 0.0);
        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                ProximityQuery::new(center, radius, 10),
                Err(GeoError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_query_rejects_bad_center() {
        assert!(ProximityQuery::new(GeoPoint::new(f64::NAN, 0.0), 100.0, 10).is_err());
        assert!(ProximityQuery::new(GeoPoint::new(0.0, 200.0), 100.0, 10).is_err());
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(1).unwrap(), 1);
        assert_eq!(clamp_limit(50).unwrap(), 50);
        assert_eq!(clamp_limit(200).unwrap(), 200);
        assert_eq!(clamp_limit(500).unwrap(), 200);
        assert_eq!(clamp_limit(i64::MAX).unwrap(), 200);
        assert!(clamp_limit(0).is_err());
        assert!(clamp_limit(-5).is_err());
    }

    #[test]
    fn test_rank_filters_and_sorts() {
        let query = ProximityQuery::new(GeoPoint::new(0.0, 0.0), 1_000.0, 10).unwrap();
        let candidates = vec![
            pin(1, 0.005, 0.0),  // ~556 m
            pin(2, 0.02, 0.0),   // ~2.2 km, outside
            pin(3, 0.001, 0.0),  // ~111 m
            pin(4, 0.0, 0.0),    // center
        ];

        let ranked = rank_candidates(&query, candidates);
        let ids: Vec<u32> = ranked.iter().map(|r| r.record.id).collect();
        assert_eq!(ids, vec![4, 3, 1]);
        assert_eq!(ranked[0].distance, 0.0);
        assert!(ranked.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let query = ProximityQuery::new(GeoPoint::new(0.0, 0.0), 1_000.0, 10).unwrap();
        let candidates = vec![pin(7, 0.001, 0.0), pin(3, 0.001, 0.0), pin(5, 0.001, 0.0)];

        let ids: Vec<u32> = rank_candidates(&query, candidates)
            .iter()
            .map(|r| r.record.id)
            .collect();
        assert_eq!(ids, vec![7, 3, 5]);
    }

    #[test]
    fn test_rank_truncates_to_limit() {
        let query = ProximityQuery::new(GeoPoint::new(0.0, 0.0), 10_000.0, 3).unwrap();
        let candidates = (0..10).map(|i| pin(i, 0.0001 * i as f64, 0.0)).collect();

        let ranked = rank_candidates(&query, candidates);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[2].record.id, 2);
    }

    #[test]
    fn test_rank_drops_nan_locations() {
        let query = ProximityQuery::new(GeoPoint::new(0.0, 0.0), 10_000.0, 10).unwrap();
        let ranked = rank_candidates(&query, vec![pin(1, f64::NAN, 0.0), pin(2, 0.0, 0.0)]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].record.id, 2);
    }

    #[test]
    fn test_merge_dedupes_and_orders_by_recency() {
        let merged = merge_newest_first(
            vec![
                vec![pin(5, 0.0, 179.9), pin(2, 0.0, 179.95)],
                vec![pin(9, 0.0, -179.9), pin(5, 0.0, 179.9), pin(1, 0.0, -179.8)],
            ],
            10,
        );
        let ids: Vec<u32> = merged.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![9, 5, 2, 1]);
    }

    #[test]
    fn test_merge_respects_cap() {
        let merged = merge_newest_first(
            vec![(0..6).map(|i| pin(i, 0.0, 0.0)).collect(), (6..12).map(|i| pin(i, 0.0, 0.0)).collect()],
            4,
        );
        let ids: Vec<u32> = merged.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![11, 10, 9, 8]);
    }

    #[test]
    fn test_distance_annotation_serializes_flat() {
        #[derive(Serialize)]
        struct Row {
            id: u32,
            title: &'static str,
        }

        let item = DistanceAnnotated {
            record: Row { id: 1, title: "hello" },
            distance: 12.5,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["title"], "hello");
        assert_eq!(json["distance"], 12.5);
        assert!(json.get("record").is_none());
    }
}
