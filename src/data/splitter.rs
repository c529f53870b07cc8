// ============================================================
// Layer 4 — Stratified Train/Validation Splitter
// ============================================================
// Splits labelled samples into two sets while preserving the
// class proportions of the input in each set:
//   - Training set:   used to update the classifier head
//   - Validation set: used to measure performance each epoch
//
// Algorithm:
//   1. Bucket sample indices by class label
//   2. Shuffle each bucket with a seeded RNG
//   3. Move round(n_class * val_fraction) samples of each
//      bucket into the validation set
//   4. Shuffle both sets so classes are interleaved
//
// A fixed seed gives the same split on every run, so the
// validation set seen by `train` can be reproduced later.
//
// Reference: rand crate documentation (SliceRandom, StdRng)

use std::collections::BTreeMap;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Split `samples` into (train, validation) with stratification on
/// the key returned by `label_of`.
///
/// # Arguments
/// * `samples`      - All available samples (consumed by this function)
/// * `val_fraction` - Proportion for validation, e.g. 0.2 = 20%
/// * `seed`         - RNG seed for the shuffles
/// * `label_of`     - Extracts the class index of a sample
pub fn split_stratified<T, F>(
    samples:      Vec<T>,
    val_fraction: f64,
    seed:         u64,
    label_of:     F,
) -> (Vec<T>, Vec<T>)
where
    F: Fn(&T) -> usize,
{
    let val_fraction = val_fraction.clamp(0.0, 1.0);
    let total        = samples.len();
    let mut rng      = StdRng::seed_from_u64(seed);

    let mut buckets: BTreeMap<usize, Vec<T>> = BTreeMap::new();
    for sample in samples {
        buckets.entry(label_of(&sample)).or_default().push(sample);
    }

    let mut train = Vec::with_capacity(total);
    let mut val   = Vec::new();

    // BTreeMap iterates classes in a fixed order, which keeps the
    // RNG stream (and therefore the split) stable for a given seed
    for (_, mut bucket) in buckets {
        bucket.shuffle(&mut rng);
        let n_val = ((bucket.len() as f64) * val_fraction).round() as usize;
        let n_val = n_val.min(bucket.len());
        let rest  = bucket.split_off(n_val);
        val.extend(bucket);
        train.extend(rest);
    }

    train.shuffle(&mut rng);
    val.shuffle(&mut rng);

    tracing::debug!(
        "Stratified split: {} training, {} validation (val_fraction={:.2})",
        train.len(),
        val.len(),
        val_fraction,
    );

    (train, val)
}

/// Keep at most `limit` samples, preserving class proportions.
/// Returns the input unchanged (order included) when it already fits.
///
/// Per-class quotas are floor(n_c * limit / total); the slots left
/// over go to the classes with the largest remainders, so the quotas
/// sum to exactly `limit`.
pub fn subsample_stratified<T, F>(
    samples:  Vec<T>,
    limit:    usize,
    seed:     u64,
    label_of: F,
) -> Vec<T>
where
    F: Fn(&T) -> usize,
{
    let total = samples.len();
    if total <= limit {
        return samples;
    }
    let mut rng = StdRng::seed_from_u64(seed);

    let mut buckets: BTreeMap<usize, Vec<T>> = BTreeMap::new();
    for sample in samples {
        buckets.entry(label_of(&sample)).or_default().push(sample);
    }

    // (quota, remainder) per class, in class order
    let mut quotas: Vec<(usize, usize)> = buckets
        .values()
        .map(|b| (b.len() * limit / total, b.len() * limit % total))
        .collect();
    let assigned: usize = quotas.iter().map(|q| q.0).sum();

    // Stable sort: equal remainders favour the lower class index
    let mut by_remainder: Vec<usize> = (0..quotas.len()).collect();
    by_remainder.sort_by(|&a, &b| quotas[b].1.cmp(&quotas[a].1));
    for &i in by_remainder.iter().take(limit - assigned) {
        quotas[i].0 += 1;
    }

    let mut kept = Vec::with_capacity(limit);
    for (mut bucket, (quota, _)) in buckets.into_values().zip(quotas) {
        bucket.shuffle(&mut rng);
        bucket.truncate(quota);
        kept.extend(bucket);
    }
    kept.shuffle(&mut rng);

    tracing::info!("Subsampled {} → {} samples", total, kept.len());
    kept
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// (id, label) pairs: `neg` zeros followed by `pos` ones
    fn labelled(neg: usize, pos: usize) -> Vec<(usize, usize)> {
        (0..neg).map(|i| (i, 0))
            .chain((0..pos).map(|i| (neg + i, 1)))
            .collect()
    }

    fn count_label(items: &[(usize, usize)], label: usize) -> usize {
        items.iter().filter(|(_, l)| *l == label).count()
    }

    #[test]
    fn test_preserves_class_proportions() {
        let (train, val) = split_stratified(labelled(60, 40), 0.2, 42, |s| s.1);
        assert_eq!(val.len(), 20);
        assert_eq!(count_label(&val, 0), 12);
        assert_eq!(count_label(&val, 1), 8);
        assert_eq!(count_label(&train, 0), 48);
        assert_eq!(count_label(&train, 1), 32);
    }

    #[test]
    fn test_partitions_are_disjoint_and_complete() {
        let (train, val) = split_stratified(labelled(33, 17), 0.3, 7, |s| s.1);
        let mut ids: Vec<usize> = train.iter().chain(val.iter()).map(|s| s.0).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = split_stratified(labelled(30, 30), 0.25, 42, |s| s.1);
        let b = split_stratified(labelled(30, 30), 0.25, 42, |s| s.1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_dataset() {
        let (train, val) = split_stratified(Vec::<(usize, usize)>::new(), 0.2, 1, |s| s.1);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }

    #[test]
    fn test_fraction_is_clamped() {
        let (train, val) = split_stratified(labelled(5, 5), 1.5, 1, |s| s.1);
        assert!(train.is_empty());
        assert_eq!(val.len(), 10);
    }

    #[test]
    fn test_subsample_keeps_balance() {
        let kept = subsample_stratified(labelled(500, 500), 100, 42, |s| s.1);
        assert_eq!(kept.len(), 100);
        assert_eq!(count_label(&kept, 0), 50);
    }

    #[test]
    fn test_subsample_never_exceeds_limit() {
        // 5/5 with limit 3: both classes would round 1.5 up to 2
        let kept = subsample_stratified(labelled(5, 5), 3, 42, |s| s.1);
        assert_eq!(kept.len(), 3);
        assert_eq!(count_label(&kept, 0), 2);
        assert_eq!(count_label(&kept, 1), 1);
    }

    #[test]
    fn test_subsample_odd_class_sizes() {
        // 7 * 5 / 11 = 3.18, 4 * 5 / 11 = 1.82 → 3 negative, 2 positive
        let kept = subsample_stratified(labelled(7, 4), 5, 3, |s| s.1);
        assert_eq!(kept.len(), 5);
        assert_eq!(count_label(&kept, 0), 3);
        assert_eq!(count_label(&kept, 1), 2);

        let mut ids: Vec<usize> = kept.iter().map(|s| s.0).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_subsample_noop_when_small() {
        let items = labelled(3, 2);
        assert_eq!(subsample_stratified(items.clone(), 10, 42, |s| s.1), items);
    }
}
