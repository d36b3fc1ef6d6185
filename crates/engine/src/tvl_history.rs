//! Daily TVL and volume history.
//!
//! TVL is reconstructed backwards from the current locked value: for a
//! cutoff `t`, every liquidity change recorded after `t` is undone.
//! Create-pool and add-liquidity entries contributed `+bch_in`;
//! remove-liquidity entries contributed `-bch_out`. Swaps move reserves
//! between sides but leave TVL within rounding, so they are ignored here.

use crate::volume::swap_volume_bch;
use dex_metrics_domain::time::{DAY_MS, LOG_EPOCH_MS};
use dex_metrics_domain::{EpochMillis, StoredTransaction, TransactionType, TvlConvention, TvlVolumePoint};
use rust_decimal::Decimal;

/// Signed BCH change in pool reserves caused by a liquidity entry.
#[must_use]
pub fn liquidity_delta_bch(tx: &StoredTransaction) -> Option<Decimal> {
    let legs = tx.legs();
    match tx.tx_type {
        TransactionType::CreatePool | TransactionType::AddLiquidity => legs.bch_in,
        TransactionType::RemoveLiquidity => legs.bch_out.map(|v| -v),
        TransactionType::Swap => None,
    }
}

/// Liquidity changes sorted by time, with suffix sums for cutoff lookups.
struct DeltaIndex {
    times: Vec<EpochMillis>,
    /// `suffix[i]` is the summed delta of entries `i..`.
    suffix: Vec<Decimal>,
}

impl DeltaIndex {
    fn build(entries: &[StoredTransaction], convention: TvlConvention) -> Self {
        let mut deltas: Vec<(EpochMillis, Decimal)> = entries
            .iter()
            .filter_map(|tx| liquidity_delta_bch(tx).map(|d| (tx.created_at, convention.scale(d))))
            .collect();
        deltas.sort_by_key(|(at, _)| *at);

        let mut suffix = vec![Decimal::ZERO; deltas.len() + 1];
        for (i, (_, delta)) in deltas.iter().enumerate().rev() {
            suffix[i] = suffix[i + 1].saturating_add(*delta);
        }
        Self {
            times: deltas.into_iter().map(|(at, _)| at).collect(),
            suffix,
        }
    }

    /// Sum of deltas recorded strictly after `cutoff`.
    fn after(&self, cutoff: EpochMillis) -> Decimal {
        let idx = self.times.partition_point(|at| *at <= cutoff);
        self.suffix[idx]
    }
}

/// TVL as of `cutoff`, floored at zero.
///
/// `current_tvl` must already be expressed under `convention`.
#[must_use]
pub fn tvl_at(
    current_tvl: Decimal,
    entries: &[StoredTransaction],
    cutoff: EpochMillis,
    convention: TvlConvention,
) -> Decimal {
    let index = DeltaIndex::build(entries, convention);
    current_tvl.saturating_sub(index.after(cutoff)).max(Decimal::ZERO)
}

/// Builds one point per day from `start` to `now`.
///
/// There are `ceil((now - start) / day)` buckets; bucket `i` covers
/// `[start + i·day, min(start + (i+1)·day, now))`. Each point is stamped
/// with its bucket start and carries the TVL at the bucket end and the
/// swap volume inside the bucket. `start` is floored at [`LOG_EPOCH_MS`].
#[must_use]
pub fn build_tvl_volume_history(
    entries: &[StoredTransaction],
    current_tvl: Decimal,
    start: EpochMillis,
    now: EpochMillis,
    convention: TvlConvention,
) -> Vec<TvlVolumePoint> {
    let start = start.max(LOG_EPOCH_MS);
    let Some(buckets) = now
        .checked_sub(start)
        .filter(|span| *span > 0)
        .and_then(|span| span.checked_add(DAY_MS - 1))
        .and_then(|span| usize::try_from(span / DAY_MS).ok())
    else {
        return Vec::new();
    };

    let mut volumes = vec![Decimal::ZERO; buckets];
    for tx in entries.iter().filter(|tx| tx.created_at >= start && tx.created_at < now) {
        let Some(volume) = swap_volume_bch(tx) else {
            continue;
        };
        if let Ok(i) = usize::try_from((tx.created_at - start) / DAY_MS)
            && let Some(slot) = volumes.get_mut(i)
        {
            *slot = slot.saturating_add(volume);
        }
    }

    let index = DeltaIndex::build(entries, convention);
    volumes
        .into_iter()
        .enumerate()
        .map(|(i, volume_bch)| {
            let bucket_start = start + DAY_MS * i as EpochMillis;
            let bucket_end = (bucket_start + DAY_MS).min(now);
            TvlVolumePoint {
                timestamp: bucket_start,
                tvl_bch: current_tvl.saturating_sub(index.after(bucket_end)).max(Decimal::ZERO),
                volume_bch,
            }
        })
        .collect()
}
