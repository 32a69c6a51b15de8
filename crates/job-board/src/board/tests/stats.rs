use super::common::*;
use crate::board::domain::{ApplicationStatus, WorkModel};
use crate::board::stats::{
    conversion_rate, monthly_counts, most_common_status, most_recent, percent, response_rate,
    status_counts, work_model_counts, CreationMonth, RECENT_LIMIT,
};
use crate::board::views::{AnalyticsReport, DashboardSummary};

use ApplicationStatus::{Applied, Interview, Offer, Rejected, ToApply};

fn with_statuses(statuses: &[ApplicationStatus]) -> Vec<crate::board::Application> {
    statuses
        .iter()
        .enumerate()
        .map(|(index, status)| card(index as u64 + 1, *status))
        .collect()
}

#[test]
fn status_histogram_is_zero_filled_and_sums_to_total() {
    let collection = with_statuses(&[Applied, Applied, Offer]);

    let counts = status_counts(&collection);

    let pairs: Vec<(ApplicationStatus, usize)> =
        counts.iter().map(|entry| (entry.status, entry.count)).collect();
    assert_eq!(
        pairs,
        vec![(ToApply, 0), (Applied, 2), (Interview, 0), (Offer, 1), (Rejected, 0)]
    );
    assert_eq!(
        counts.iter().map(|entry| entry.count).sum::<usize>(),
        collection.len()
    );
}

#[test]
fn response_rate_boundaries() {
    assert_eq!(response_rate(&[]), 0);
    assert_eq!(response_rate(&with_statuses(&[Offer, Offer, Offer])), 100);
    assert_eq!(response_rate(&with_statuses(&[ToApply, Applied])), 0);
}

#[test]
fn response_rate_counts_interview_offer_and_rejected() {
    let collection = with_statuses(&[Interview, Offer, Rejected, ToApply]);
    assert_eq!(response_rate(&collection), 75);
}

#[test]
fn percentages_round_half_up() {
    assert_eq!(percent(1, 8), 13);
    assert_eq!(percent(1, 3), 33);
    assert_eq!(percent(2, 3), 67);
    assert_eq!(percent(0, 0), 0);
}

#[test]
fn conversion_rate_tracks_interviews_only() {
    let collection = with_statuses(&[Interview, Offer, Rejected, Interview]);
    assert_eq!(conversion_rate(&collection), 50);
    assert_eq!(conversion_rate(&[]), 0);
}

#[test]
fn work_model_histogram_uses_unspecified_sentinel() {
    let collection = vec![
        detailed_card(1, Applied, Some(WorkModel::Hybrid), None),
        detailed_card(2, Applied, None, None),
        detailed_card(3, Offer, Some(WorkModel::Remote), None),
        detailed_card(4, Offer, Some(WorkModel::Hybrid), None),
        detailed_card(5, ToApply, None, None),
    ];

    let counts = work_model_counts(&collection);

    let pairs: Vec<(&str, usize)> = counts.iter().map(|entry| (entry.label, entry.count)).collect();
    assert_eq!(pairs, vec![("Hybrid", 2), ("Unspecified", 2), ("Remote", 1)]);
    assert_eq!(
        counts.iter().map(|entry| entry.count).sum::<usize>(),
        collection.len()
    );
    assert!(work_model_counts(&[]).is_empty());
}

#[test]
fn monthly_histogram_keeps_first_seen_bucket_order() {
    let collection = vec![
        detailed_card(1, Applied, None, Some((2025, 3, 2))),
        detailed_card(2, Applied, None, Some((2025, 1, 20))),
        detailed_card(3, Applied, None, Some((2025, 3, 28))),
        detailed_card(4, Applied, None, None),
        detailed_card(5, Applied, None, Some((2024, 12, 31))),
    ];

    let buckets = monthly_counts(&collection);

    let labels: Vec<(&str, usize)> = buckets
        .iter()
        .map(|bucket| (bucket.label.as_str(), bucket.count))
        .collect();
    assert_eq!(
        labels,
        vec![("Mar 2025", 2), ("Jan 2025", 1), ("Undated", 1), ("Dec 2024", 1)]
    );
    assert_eq!(
        buckets[0].month,
        CreationMonth::Month {
            year: 2025,
            month: 3
        }
    );
}

#[test]
fn most_common_status_prefers_first_seen_on_ties() {
    assert_eq!(most_common_status(&[]), None);
    assert_eq!(
        most_common_status(&with_statuses(&[Rejected, Applied, Applied, Rejected])),
        Some(Rejected)
    );
    assert_eq!(
        most_common_status(&with_statuses(&[Rejected, Applied, Applied])),
        Some(Applied)
    );
}

#[test]
fn most_recent_orders_by_descending_id() {
    let collection: Vec<_> = [4, 11, 2, 9, 7, 1, 10]
        .into_iter()
        .map(|id| card(id, Applied))
        .collect();

    let recent = most_recent(&collection, RECENT_LIMIT);

    assert_eq!(ids(&recent), vec![11, 10, 9, 7, 4]);
    assert!(most_recent(&[], RECENT_LIMIT).is_empty());
}

#[test]
fn dashboard_summary_counts_pipeline_stages() {
    let collection = with_statuses(&[Interview, Offer, Rejected, ToApply, Interview, Applied]);

    let summary = DashboardSummary::from_collection(&collection);

    assert_eq!(summary.total, 6);
    assert_eq!(summary.interviews, 2);
    assert_eq!(summary.offers, 1);
    assert_eq!(summary.response_rate, 67);
    assert_eq!(ids(&summary.recent), vec![6, 5, 4, 3, 2]);
}

#[test]
fn analytics_report_is_total_on_empty_collections() {
    let report = AnalyticsReport::from_collection(&[]);

    assert_eq!(report.total, 0);
    assert_eq!(report.status_counts.len(), 5);
    assert!(report.status_counts.iter().all(|entry| entry.count == 0));
    assert!(report.work_models.is_empty());
    assert!(report.monthly.is_empty());
    assert_eq!(report.most_common_status, None);
    assert_eq!(report.most_common_label(), "N/A");
    assert_eq!(report.conversion_rate, 0);
}
