// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wall data: names and labels fetched from storage, and the schedules
//! served to clients.

use crate::db::{collections, FirestoreDb, Filter, Query};
use crate::services::testimonies::list_public_testimonies;
use crate::wall::wailing::{ScrollFrame, Section};
use crate::wall::{
    format_brick_name, NamePages, Slot, TestimonyWall, Timing, WailingWall, WallLayout,
};
use rand::Rng;
use serde::Serialize;

/// Upper bound on names loaded for one wall.
const MAX_WALL_NAMES: u32 = 2000;

/// Names of public souls. Errors are logged and yield no names.
pub async fn fetch_wall_names(db: &FirestoreDb) -> Vec<String> {
    fetch_wall_names_up_to(db, MAX_WALL_NAMES).await
}

async fn fetch_wall_names_up_to(db: &FirestoreDb, limit: u32) -> Vec<String> {
    let query = Query::new()
        .filter(Filter::eq("isPublic", true))
        .limit(limit);

    let docs = match db.query_documents(collections::SOULS, &query).await {
        Ok(docs) => docs,
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch wall names");
            return Vec::new();
        }
    };

    if docs.len() >= limit as usize {
        tracing::warn!(
            limit,
            "Wall name limit reached; remaining public souls are not shown"
        );
    }

    docs.into_iter()
        .filter_map(|doc| doc.get("name").and_then(|v| v.as_str()).map(str::to_string))
        .filter(|name| !name.trim().is_empty())
        .collect()
}

/// Initial state of a wailing wall, as sent to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WailingSnapshot {
    pub layout: WallLayout,
    /// Pixels per second
    pub speed: f64,
    pub cycle_ms: f64,
    /// Brick labels per page; clients cycle through them in order.
    pub pages: Vec<Vec<String>>,
    pub front: Slot,
    pub sections: [Section; 2],
    pub frame: ScrollFrame,
}

impl WailingSnapshot {
    pub fn of(wall: &WailingWall) -> Self {
        let pages = wall
            .pages()
            .pages()
            .iter()
            .map(|page| page.iter().map(|name| format_brick_name(name)).collect())
            .collect();

        Self {
            layout: *wall.layout(),
            speed: wall.speed(),
            cycle_ms: wall.cycle_ms(),
            pages,
            front: wall.front(),
            sections: [wall.section(Slot::A).clone(), wall.section(Slot::B).clone()],
            frame: wall.frame(),
        }
    }
}

pub fn build_wailing_wall<R: Rng + ?Sized>(
    names: Vec<String>,
    layout: WallLayout,
    speed: f64,
    rng: &mut R,
) -> WailingWall {
    let pages = NamePages::new(names, layout.capacity(), rng);
    tracing::debug!(
        pages = pages.total_pages(),
        capacity = pages.capacity(),
        "Built wailing wall pages"
    );
    WailingWall::new(layout, pages, speed, rng)
}

/// Testimony wall labelled with the display names of approved testimonies.
pub async fn build_testimony_wall<R: Rng + ?Sized>(
    db: &FirestoreDb,
    layout: WallLayout,
    timing: Timing,
    rng: &mut R,
) -> TestimonyWall {
    let labels: Vec<String> = list_public_testimonies(db, Some(layout.capacity() as u32))
        .await
        .into_iter()
        .map(|t| t.display_name)
        .collect();
    TestimonyWall::new(layout, &labels, timing, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    async fn add_soul(db: &FirestoreDb, name: &str, public: bool) {
        let fields = json!({"name": name, "isPublic": public});
        db.add_document(collections::SOULS, fields.as_object().cloned().unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_fetch_wall_names_only_public() {
        let db = FirestoreDb::new_in_memory();
        add_soul(&db, "john doe", true).await;
        add_soul(&db, "hidden person", false).await;
        add_soul(&db, "  ", true).await;

        assert_eq!(fetch_wall_names(&db).await, vec!["john doe"]);
    }

    #[tokio::test]
    async fn test_fetch_wall_names_stops_at_limit() {
        let db = FirestoreDb::new_in_memory();
        for name in ["ann lee", "bob ray", "cy young"] {
            add_soul(&db, name, true).await;
        }

        assert_eq!(fetch_wall_names_up_to(&db, 2).await.len(), 2);
        assert_eq!(fetch_wall_names_up_to(&db, 5).await.len(), 3);
    }

    #[test]
    fn test_snapshot_formats_labels() {
        let mut rng = StdRng::seed_from_u64(7);
        let layout = WallLayout::for_viewport(184.0, 42.0);
        let wall = build_wailing_wall(vec!["john doe".to_string()], layout, 40.0, &mut rng);

        let snapshot = WailingSnapshot::of(&wall);
        assert_eq!(snapshot.pages.len(), 1);
        assert_eq!(snapshot.pages[0].len(), layout.capacity());
        assert!(snapshot.pages[0].contains(&"John D.".to_string()));
        assert_eq!(snapshot.front, Slot::A);
        assert_eq!(snapshot.cycle_ms, 184.0 / 40.0 * 1000.0);
    }

    #[test]
    fn test_no_names_gives_blank_wall() {
        let mut rng = StdRng::seed_from_u64(1);
        let layout = WallLayout::for_viewport(390.0, 844.0);
        let wall = build_wailing_wall(Vec::new(), layout, 40.0, &mut rng);
        let snapshot = WailingSnapshot::of(&wall);
        assert!(snapshot.pages.is_empty());
        assert!(snapshot.sections[0]
            .bricks
            .iter()
            .all(|brick| brick.label.is_none()));
    }
}
