//! Demo data generator: category counts and fabricated comment rows for a
//! date period. Output is a pure function of the period strings, so the same
//! request always produces the same report.

use serde::Serialize;
use time::{Duration, OffsetDateTime};

use crate::categories::{
    templates_for, AUTHOR_FIRST_NAMES, AUTHOR_LAST_NAMES, BUS_ROUTES, CATEGORIES, CITY_PLACES,
    CLINICS,
};
use crate::clock::{fmt_rfc3339, parse_instant};
use crate::error::{FeedbackError, PeriodUse};

/// Source of reproducible pseudo-random integers keyed by an explicit seed.
///
/// Implementations must be deterministic: the same `(seed, min, max)` always
/// yields the same value. This is not a cryptographic generator and must not
/// be used for anything security-relevant.
pub trait SeededGenerator: Send + Sync {
    /// Integer in the inclusive range `[min, max]`.
    fn int_in(&self, seed: i64, min: i64, max: i64) -> i64;
}

/// Fractional part of `|sin(seed) * 10000|`, scaled to the range.
#[derive(Clone, Copy, Debug, Default)]
pub struct SineHash;

impl SeededGenerator for SineHash {
    fn int_in(&self, seed: i64, min: i64, max: i64) -> i64 {
        let normalized = ((seed as f64).sin() * 10000.0).abs();
        let fraction = normalized - normalized.floor();
        (fraction * (max - min + 1) as f64).floor() as i64 + min
    }
}

/// Validated `[from, to]` request period. The raw strings are kept because
/// they seed the generator.
#[derive(Clone, Debug)]
pub struct Period {
    pub from: String,
    pub to: String,
    start: OffsetDateTime,
    end: OffsetDateTime,
}

impl Period {
    pub fn parse(from: &str, to: &str, purpose: PeriodUse) -> Result<Self, FeedbackError> {
        let (Some(start), Some(end)) = (parse_instant(from), parse_instant(to)) else {
            return Err(FeedbackError::InvalidPeriod(purpose));
        };
        if start > end {
            return Err(FeedbackError::RangeOrder);
        }
        Ok(Self {
            from: from.to_string(),
            to: to.to_string(),
            start,
            end,
        })
    }

    fn seed(&self) -> i64 {
        char_code_sum(&format!("{}:{}", self.from, self.to))
    }
}

/// Sum of UTF-16 code units.
pub fn char_code_sum(input: &str) -> i64 {
    input.encode_utf16().map(i64::from).sum()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryStat {
    pub category: &'static str,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub from: String,
    pub to: String,
    pub generated_at: String,
    pub total: u32,
    pub categories: Vec<CategoryStat>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCommentRow {
    pub comment_text: String,
    pub category: &'static str,
    pub published_at: String,
    pub likes_count: i64,
    pub author_name: String,
    pub author_profile_url: String,
    pub post_url: String,
    pub comment_url: String,
}

pub fn category_counts(period: &Period) -> Vec<CategoryStat> {
    let seed = period.seed();
    CATEGORIES
        .iter()
        .enumerate()
        .map(|(index, &category)| CategoryStat {
            category,
            count: ((seed + index as i64 * 29).rem_euclid(42) + 6) as u32,
        })
        .collect()
}

pub fn statistics(period: &Period, now: OffsetDateTime) -> StatisticsResponse {
    let categories = category_counts(period);
    StatisticsResponse {
        from: period.from.clone(),
        to: period.to.clone(),
        generated_at: fmt_rfc3339(now),
        total: categories.iter().map(|c| c.count).sum(),
        categories,
    }
}

/// Seeded choice from `items`; an empty pool yields `""`.
fn pick<'a>(rng: &dyn SeededGenerator, seed: i64, items: &[&'a str]) -> &'a str {
    let Some(last) = items.len().checked_sub(1) else {
        return "";
    };
    let idx = rng.int_in(seed, 0, last as i64).clamp(0, last as i64);
    items[idx as usize]
}

fn author_name(rng: &dyn SeededGenerator, seed: i64) -> String {
    let first = pick(rng, seed + 3, &AUTHOR_FIRST_NAMES);
    let last = pick(rng, seed + 7, &AUTHOR_LAST_NAMES);
    format!("{last} {first}")
}

fn comment_text(rng: &dyn SeededGenerator, category: &str, seed: i64) -> String {
    let template = pick(rng, seed + 29, templates_for(category));
    let place = pick(rng, seed + 41, &CITY_PLACES);
    let house = rng.int_in(seed + 43, 1, 200);
    let route = pick(rng, seed + 47, &BUS_ROUTES);
    let clinic = pick(rng, seed + 53, &CLINICS);

    template
        .replace("{place}", place)
        .replace("{house}", &house.to_string())
        .replace("{route}", route)
        .replace("{clinic}", clinic)
}

/// One fabricated comment per unit of each category count, ordered by
/// publish time.
pub fn report_rows(period: &Period, rng: &dyn SeededGenerator) -> Vec<ReportCommentRow> {
    let duration_ms = ((period.end - period.start).whole_milliseconds() as i64).max(1);
    let base_seed = period.seed();

    let mut rows: Vec<(OffsetDateTime, ReportCommentRow)> = Vec::new();
    let mut global_index: i64 = 0;

    for (category_index, stat) in category_counts(period).iter().enumerate() {
        let category_index = category_index as i64;
        for local_index in 0..stat.count as i64 {
            let seed = base_seed + category_index * 1000 + local_index * 13 + global_index;
            let published_at =
                period.start + Duration::milliseconds(rng.int_in(seed + 17, 0, duration_ms));
            let author_id = 100_000 + seed;
            let post_id = 200_000 + category_index * 1000 + local_index;
            let comment_id = 500_000 + global_index;

            rows.push((
                published_at,
                ReportCommentRow {
                    comment_text: comment_text(rng, stat.category, seed),
                    category: stat.category,
                    published_at: fmt_rfc3339(published_at),
                    likes_count: rng.int_in(seed + 23, 0, 180),
                    author_name: author_name(rng, seed),
                    author_profile_url: format!("https://vk.com/id{author_id}"),
                    post_url: format!("https://vk.com/wall-{post_id}_{comment_id}"),
                    comment_url: format!(
                        "https://vk.com/wall-{post_id}_{comment_id}?reply={comment_id}"
                    ),
                },
            ));
            global_index += 1;
        }
    }

    rows.sort_by_key(|(at, _)| *at);
    rows.into_iter().map(|(_, row)| row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn period(from: &str, to: &str) -> Period {
        Period::parse(from, to, PeriodUse::Statistics).unwrap()
    }

    /// Always returns `min`.
    struct Floor;

    impl SeededGenerator for Floor {
        fn int_in(&self, _seed: i64, min: i64, _max: i64) -> i64 {
            min
        }
    }

    #[test]
    fn counts_follow_seed_formula() {
        let p = period("2026-01-01", "2026-01-31");
        let seed = char_code_sum("2026-01-01:2026-01-31");
        let counts = category_counts(&p);
        assert_eq!(counts.len(), CATEGORIES.len());
        for (i, stat) in counts.iter().enumerate() {
            assert_eq!(stat.category, CATEGORIES[i]);
            assert_eq!(stat.count as i64, (seed + i as i64 * 29) % 42 + 6);
            assert!((6..=47).contains(&stat.count));
        }
    }

    #[test]
    fn statistics_are_repeatable() {
        let p = period("2026-02-01T00:00:00Z", "2026-02-08T00:00:00Z");
        let now = datetime!(2026-02-09 12:00 UTC);
        let a = statistics(&p, now);
        let b = statistics(&p, now);
        assert_eq!(a, b);
        assert_eq!(a.total, a.categories.iter().map(|c| c.count).sum::<u32>());
        assert_eq!(a.generated_at, "2026-02-09T12:00:00Z");
    }

    #[test]
    fn inverted_and_malformed_periods_are_rejected() {
        assert!(matches!(
            Period::parse("2026-02-08", "2026-02-01", PeriodUse::Statistics),
            Err(FeedbackError::RangeOrder)
        ));
        assert!(matches!(
            Period::parse("yesterday", "2026-02-01", PeriodUse::Export),
            Err(FeedbackError::InvalidPeriod(PeriodUse::Export))
        ));
        assert!(Period::parse("2026-02-01", "2026-02-01", PeriodUse::Statistics).is_ok());
    }

    #[test]
    fn sine_hash_stays_in_range_and_repeats() {
        let rng = SineHash;
        for seed in -500..500 {
            let v = rng.int_in(seed, 3, 9);
            assert!((3..=9).contains(&v), "seed {seed} gave {v}");
            assert_eq!(v, rng.int_in(seed, 3, 9));
        }
    }

    #[test]
    fn rows_match_counts_and_are_sorted() {
        let p = period("2026-03-01", "2026-03-15");
        let rows = report_rows(&p, &SineHash);
        let total: u32 = category_counts(&p).iter().map(|c| c.count).sum();
        assert_eq!(rows.len(), total as usize);

        let times: Vec<OffsetDateTime> = rows
            .iter()
            .map(|r| parse_instant(&r.published_at).unwrap())
            .collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
        assert!(times.iter().all(|t| {
            *t >= datetime!(2026-03-01 00:00 UTC) && *t <= datetime!(2026-03-15 00:00 UTC)
        }));
        assert!(rows.iter().all(|r| (0..=180).contains(&r.likes_count)));
        assert!(rows.iter().all(|r| !r.comment_text.contains('{')));

        assert_eq!(rows, report_rows(&p, &SineHash));
    }

    #[test]
    fn pick_tolerates_empty_and_wild_generators() {
        struct Wild;
        impl SeededGenerator for Wild {
            fn int_in(&self, seed: i64, _min: i64, _max: i64) -> i64 {
                seed
            }
        }
        assert_eq!(pick(&SineHash, 1, &[]), "");
        assert_eq!(pick(&Wild, 99, &["a", "b"]), "b");
        assert_eq!(pick(&Wild, -5, &["a", "b"]), "a");
    }

    #[test]
    fn rows_use_injected_generator() {
        let p = period("2026-03-01", "2026-03-01");
        let rows = report_rows(&p, &Floor);
        let first = rows
            .iter()
            .find(|r| r.category == CATEGORIES[0])
            .unwrap();
        assert_eq!(first.author_name, "Smirnov Ivan");
        assert_eq!(
            first.comment_text,
            "На ул. Ленина, дом 1, с утра нет холодной воды. Уже не первый раз за неделю."
        );
        assert_eq!(first.likes_count, 0);
        assert_eq!(first.published_at, "2026-03-01T00:00:00Z");
        assert_eq!(first.post_url, "https://vk.com/wall-200000_500000");
        assert_eq!(
            first.comment_url,
            "https://vk.com/wall-200000_500000?reply=500000"
        );
    }
}
