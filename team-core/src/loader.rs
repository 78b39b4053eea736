//! Batched catalog retrieval.
//!
//! Base ids are fetched in sequential batches (each batch fully concurrent),
//! a batch is retried only when every request in it failed, and the curated
//! variants are fetched in one concurrent sweep at the end. Failures never
//! abort the load; they are logged and reported in [`CatalogLoad`].

use std::ops::RangeInclusive;

use futures::future::join_all;
use log::{debug, info, warn};

use crate::catalog::{CatalogEntry, CatalogPayload};
use crate::constants::{BATCH_SIZE, CATALOG_UNIVERSE, MAX_BATCH_ATTEMPTS, RETRY_DELAY_MS};
use crate::error::{EntryError, FetchError};
use crate::variants::VariantForm;

/// Remote catalog access. Implementations are single-threaded (`?Send`).
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    /// Body of `GET /pokemon/{key}`; `key` is a numeric id or an api name.
    async fn fetch_text(&self, key: &str) -> Result<String, FetchError>;

    /// Wait between batch attempts.
    async fn sleep_ms(&self, ms: u32);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoaderConfig {
    pub universe: u32,
    pub batch_size: u32,
    pub max_attempts: u32,
    pub retry_delay_ms: u32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            universe: CATALOG_UNIVERSE,
            batch_size: BATCH_SIZE,
            max_attempts: MAX_BATCH_ATTEMPTS,
            retry_delay_ms: RETRY_DELAY_MS,
        }
    }
}

impl LoaderConfig {
    /// Id ranges in request order; the last one is truncated to the universe.
    pub fn batches(&self) -> Vec<RangeInclusive<u32>> {
        let step = self.batch_size.max(1);
        (1..=self.universe)
            .step_by(step as usize)
            .map(|start| start..=(start + step - 1).min(self.universe))
            .collect()
    }
}

/// Snapshot published after every batch and once more at the end.
#[derive(Clone, Copy, Debug)]
pub struct LoadProgress<'a> {
    pub entries: &'a [CatalogEntry],
    pub loaded: usize,
    pub total: u32,
    pub finished: bool,
}

impl LoadProgress<'_> {
    /// Share of the base universe loaded so far, capped at 1.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.loaded as f64 / f64::from(self.total)).min(1.0)
    }
}

/// Outcome of a full load: the merged list plus every gap it has.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogLoad {
    /// Base entries in ascending id order, then surviving variants in curated order.
    pub entries: Vec<CatalogEntry>,
    /// Batches that failed on every attempt.
    pub failed_ranges: Vec<RangeInclusive<u32>>,
    /// Ids dropped individually inside otherwise successful batches.
    pub dropped_ids: Vec<u32>,
    /// Api names of variants that could not be fetched.
    pub failed_variants: Vec<String>,
}

impl CatalogLoad {
    pub fn is_complete(&self) -> bool {
        self.failed_ranges.is_empty() && self.dropped_ids.is_empty() && self.failed_variants.is_empty()
    }
}

#[derive(Default)]
struct FetchedBatch {
    entries: Vec<CatalogEntry>,
    dropped: Vec<u32>,
}

/// Fetch the whole catalog, publishing progress through `on_progress`.
pub async fn load_catalog<S, F>(
    source: &S,
    config: &LoaderConfig,
    variants: &[VariantForm],
    mut on_progress: F,
) -> CatalogLoad
where
    S: CatalogSource,
    F: FnMut(LoadProgress<'_>),
{
    let mut load = CatalogLoad::default();
    let batches = config.batches();
    debug!(
        "catalog: {} ids in {} batches of {}",
        config.universe,
        batches.len(),
        config.batch_size
    );

    for range in batches {
        match fetch_batch(source, config, range.clone()).await {
            Some(batch) => {
                load.entries.extend(batch.entries);
                load.dropped_ids.extend(batch.dropped);
            }
            None => {
                warn!(
                    "catalog: giving up on ids {}-{} after {} attempts",
                    range.start(),
                    range.end(),
                    config.max_attempts
                );
                load.failed_ranges.push(range);
            }
        }
        on_progress(LoadProgress {
            entries: &load.entries,
            loaded: load.entries.len(),
            total: config.universe,
            finished: false,
        });
    }
    let base_count = load.entries.len();
    info!("catalog: {base_count} base entries loaded");

    let (found, failed) = fetch_variants(source, variants).await;
    info!(
        "catalog: {} of {} variants loaded",
        found.len(),
        variants.len()
    );
    load.entries.extend(found);
    load.failed_variants = failed;

    on_progress(LoadProgress {
        entries: &load.entries,
        loaded: base_count,
        total: config.universe,
        finished: true,
    });
    load
}

async fn fetch_batch<S: CatalogSource>(
    source: &S,
    config: &LoaderConfig,
    range: RangeInclusive<u32>,
) -> Option<FetchedBatch> {
    for attempt in 1..=config.max_attempts {
        let responses = join_all(
            range
                .clone()
                .map(|id| async move { (id, source.fetch_text(&id.to_string()).await) }),
        )
        .await;

        if responses.iter().all(|(_, r)| r.is_err()) {
            warn!(
                "catalog: every request failed for ids {}-{} (attempt {attempt}/{})",
                range.start(),
                range.end(),
                config.max_attempts
            );
            if attempt < config.max_attempts {
                source.sleep_ms(config.retry_delay_ms).await;
            }
            continue;
        }

        let mut batch = FetchedBatch::default();
        for (id, result) in responses {
            match result
                .map_err(EntryError::from)
                .and_then(|body| CatalogPayload::parse(&body).map_err(EntryError::from))
            {
                Ok(payload) => batch.entries.push(payload.into_base_entry()),
                Err(e) => {
                    warn!("catalog: dropping entry {id}: {e}");
                    batch.dropped.push(id);
                }
            }
        }
        return Some(batch);
    }
    None
}

async fn fetch_variants<S: CatalogSource>(
    source: &S,
    variants: &[VariantForm],
) -> (Vec<CatalogEntry>, Vec<String>) {
    let results = join_all(
        variants
            .iter()
            .map(|form| async move { (form, fetch_variant(source, form).await) }),
    )
    .await;

    let mut found = Vec::new();
    let mut failed = Vec::new();
    for (form, result) in results {
        match result {
            Ok(entry) => found.push(entry),
            Err(e) => {
                warn!("catalog: variant {} unavailable: {e}", form.api_name);
                failed.push(form.api_name.to_string());
            }
        }
    }
    (found, failed)
}

async fn fetch_variant<S: CatalogSource>(
    source: &S,
    form: &VariantForm,
) -> Result<CatalogEntry, EntryError> {
    let body = source.fetch_text(form.api_name).await?;
    let payload = CatalogPayload::parse(&body)?;
    Ok(payload.into_variant_entry(form))
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::{HashMap, HashSet};

    use super::*;

    fn body(id: u32, name: &str) -> String {
        format!(
            r#"{{"id":{id},"name":"{name}","sprites":{{"front_default":"https://img/{id}.png","other":{{"official-artwork":{{"front_default":"https://art/{id}.png"}}}}}}}}"#
        )
    }

    /// In-memory catalog. Numeric keys answer with a generated payload unless
    /// scripted otherwise; names must be registered.
    #[derive(Default)]
    struct FakeSource {
        /// Remaining transport failures per key before it starts answering.
        flaky: RefCell<HashMap<String, u32>>,
        /// Keys that always fail with a status.
        missing: HashSet<String>,
        /// Keys answered with a fixed body.
        bodies: HashMap<String, String>,
        sleeps: Cell<u32>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeSource {
        fn flaky_range(self, range: RangeInclusive<u32>, failures: u32) -> Self {
            for id in range {
                self.flaky.borrow_mut().insert(id.to_string(), failures);
            }
            self
        }
    }

    impl CatalogSource for FakeSource {
        async fn fetch_text(&self, key: &str) -> Result<String, FetchError> {
            self.calls.borrow_mut().push(key.to_string());
            if let Some(left) = self.flaky.borrow_mut().get_mut(key)
                && *left > 0
            {
                *left -= 1;
                return Err(FetchError::Network("connection reset".into()));
            }
            if self.missing.contains(key) {
                return Err(FetchError::Status(404));
            }
            if let Some(b) = self.bodies.get(key) {
                return Ok(b.clone());
            }
            match key.parse::<u32>() {
                Ok(id) => Ok(body(id, &format!("mon-{id}"))),
                Err(_) => Err(FetchError::Status(404)),
            }
        }

        async fn sleep_ms(&self, _ms: u32) {
            self.sleeps.set(self.sleeps.get() + 1);
        }
    }

    fn small_config(universe: u32) -> LoaderConfig {
        LoaderConfig {
            universe,
            ..LoaderConfig::default()
        }
    }

    #[test]
    fn batches_cover_universe_and_truncate_last() {
        let b = LoaderConfig::default().batches();
        assert_eq!(b.len(), 21);
        assert_eq!(b[0], 1..=50);
        assert_eq!(b[1], 51..=100);
        assert_eq!(b[20], 1001..=1025);
        assert!(small_config(0).batches().is_empty());
        assert_eq!(small_config(7).batches(), vec![1..=7]);
    }

    #[test]
    fn full_load_is_ordered_and_complete() {
        let source = FakeSource::default();
        let mut progress = Vec::new();
        let load = pollster::block_on(load_catalog(&source, &small_config(120), &[], |p| {
            progress.push((p.loaded, p.finished, p.fraction()));
        }));
        let ids: Vec<u32> = load.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, (1..=120).collect::<Vec<_>>());
        assert!(load.is_complete());
        assert_eq!(
            progress,
            vec![
                (50, false, 50.0 / 120.0),
                (100, false, 100.0 / 120.0),
                (120, false, 1.0),
                (120, true, 1.0)
            ]
        );
        assert_eq!(source.sleeps.get(), 0);
        assert_eq!(load.entries[0].generation.number(), 1);
        assert_eq!(load.entries[119].alternate_image.as_deref(), Some("https://art/120.png"));
    }

    #[test]
    fn batch_recovers_on_third_attempt_with_two_delays() {
        let source = FakeSource::default().flaky_range(1..=50, 2);
        let load = pollster::block_on(load_catalog(&source, &small_config(50), &[], |_| {}));
        assert_eq!(load.entries.len(), 50);
        assert!(load.failed_ranges.is_empty());
        assert_eq!(source.sleeps.get(), 2);
        assert_eq!(source.calls.borrow().len(), 150);
    }

    #[test]
    fn exhausted_batch_is_skipped_and_reported() {
        let source = FakeSource::default().flaky_range(51..=100, 5);
        let mut snapshots = Vec::new();
        let load = pollster::block_on(load_catalog(&source, &small_config(150), &[], |p| {
            snapshots.push(p.loaded);
        }));
        assert_eq!(load.entries.len(), 100);
        assert_eq!(load.failed_ranges, vec![51..=100]);
        assert_eq!(snapshots, vec![50, 50, 100, 100]);
        // three attempts, delays only between them
        assert_eq!(source.sleeps.get(), 2);
        assert_eq!(load.entries[50].id, 101);
    }

    #[test]
    fn partial_failures_do_not_retry_the_batch() {
        let mut source = FakeSource::default();
        source.missing.insert("3".into());
        source.bodies.insert("4".into(), "OK".into());
        source.bodies.insert("5".into(), String::new());
        source.bodies.insert("6".into(), "{not json".into());
        let load = pollster::block_on(load_catalog(&source, &small_config(10), &[], |_| {}));
        let ids: Vec<u32> = load.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 7, 8, 9, 10]);
        assert_eq!(load.dropped_ids, vec![3, 4, 5, 6]);
        assert_eq!(source.sleeps.get(), 0);
        assert_eq!(source.calls.borrow().len(), 10);
    }

    #[test]
    fn variants_follow_base_entries_in_curated_order() {
        let forms = [
            VariantForm {
                api_name: "vulpix-alola",
                display_name: "Alolan Vulpix",
                base_id: 37,
            },
            VariantForm {
                api_name: "missing-form",
                display_name: "Missing",
                base_id: 1,
            },
            VariantForm {
                api_name: "slowking-galar",
                display_name: "Galarian Slowking",
                base_id: 199,
            },
        ];
        let mut source = FakeSource::default();
        source
            .bodies
            .insert("vulpix-alola".into(), body(10103, "vulpix-alola"));
        source
            .bodies
            .insert("slowking-galar".into(), body(10172, "slowking-galar"));
        let mut last = None;
        let load = pollster::block_on(load_catalog(&source, &small_config(3), &forms, |p| {
            last = Some((p.entries.len(), p.loaded, p.finished));
        }));
        let names: Vec<&str> = load.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["mon-1", "mon-2", "mon-3", "Alolan Vulpix", "Galarian Slowking"]
        );
        assert_eq!(load.entries[3].id, 10103);
        assert_eq!(load.entries[3].generation.number(), 1);
        assert_eq!(load.entries[4].generation.number(), 2);
        assert_eq!(load.failed_variants, vec!["missing-form".to_string()]);
        assert_eq!(last, Some((5, 3, true)));
    }

    #[test]
    fn variants_are_fetched_even_when_base_batches_fail() {
        let forms = [VariantForm {
            api_name: "raichu-alola",
            display_name: "Alolan Raichu",
            base_id: 26,
        }];
        let mut source = FakeSource::default().flaky_range(1..=5, 10);
        source
            .bodies
            .insert("raichu-alola".into(), body(10100, "raichu-alola"));
        let load = pollster::block_on(load_catalog(&source, &small_config(5), &forms, |_| {}));
        assert_eq!(load.failed_ranges, vec![1..=5]);
        assert_eq!(load.entries.len(), 1);
        assert_eq!(load.entries[0].name, "Alolan Raichu");
        // variant failures are never retried
        let variant_calls = source
            .calls
            .borrow()
            .iter()
            .filter(|k| k.as_str() == "raichu-alola")
            .count();
        assert_eq!(variant_calls, 1);
    }

    #[test]
    fn fraction_handles_empty_universe() {
        let p = LoadProgress {
            entries: &[],
            loaded: 0,
            total: 0,
            finished: true,
        };
        assert_eq!(p.fraction(), 1.0);
    }
}
