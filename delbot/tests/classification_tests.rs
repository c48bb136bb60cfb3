//! Integration tests for the per-day classification pass.

use chrono::{DateTime, NaiveDate, Utc};

use delbot::classification::classify_day;
use delbot::models::CategoryKind;
use delbot::parsing::record::{RawCategory, RawPageRecord, RawProtection};
use delbot::wiki::LocalWiki;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn instant(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    date(y, m, d).and_hms_opt(h, 0, 0).unwrap().and_utc()
}

fn category(title: &str, sortkey: &str, timestamp: &str) -> RawCategory {
    RawCategory {
        title: Some(title.to_string()),
        sortkey_prefix: Some(sortkey.to_string()),
        timestamp: Some(timestamp.to_string()),
    }
}

fn record(id: u64, subject: &str, categories: Vec<RawCategory>) -> RawPageRecord {
    RawPageRecord {
        page_id: Some(id),
        title: Some(format!("Wikipedia:Pagine da cancellare/{}", subject)),
        length: Some(4000),
        touched: Some("2018-05-05T00:00:00Z".to_string()),
        protection: Some(vec![]),
        categories: Some(categories),
    }
}

/// A wiki that knows the revision dates of the given pages.
fn wiki_with_history(ids: &[u64]) -> LocalWiki {
    let wiki = LocalWiki::new();
    for (idx, &id) in ids.iter().enumerate() {
        wiki.set_creation_date(id, instant(2018, 5, 4, 8 + idx as u32));
        wiki.set_lastedit_date(id, instant(2018, 5, 11, 8 + idx as u32));
    }
    wiki
}

#[tokio::test]
async fn duplicate_sightings_merge_to_the_most_specific_variant() {
    let day_list = vec![record(
        1,
        "Foo",
        vec![category(
            "Categoria:Cancellazioni del 4 maggio 2018",
            "Foo",
            "2018-05-04T09:41:00Z",
        )],
    )];
    let voting_list = vec![record(
        1,
        "Foo",
        vec![category(
            "Categoria:Cancellazioni con votazione del 4 maggio 2018",
            "Foo",
            "2018-05-07T09:41:00Z",
        )],
    )];

    let wiki = wiki_with_history(&[1]);

    // Same outcome regardless of which list is consumed first.
    for grouped in [
        vec![
            (CategoryKind::Day, day_list.clone()),
            (CategoryKind::Voting, voting_list.clone()),
        ],
        vec![
            (CategoryKind::Voting, voting_list.clone()),
            (CategoryKind::Day, day_list.clone()),
        ],
    ] {
        let result = classify_day(date(2018, 5, 4), grouped, &wiki).await.unwrap();

        assert_eq!(result.len(), 1);
        let pdcs = &result.by_kind[&CategoryKind::Voting];
        assert_eq!(pdcs.len(), 1);
        assert_eq!(pdcs[0].id(), 1);
        assert_eq!(pdcs[0].kind(), CategoryKind::Voting);
    }
}

#[tokio::test]
async fn strays_from_adjacent_dates_are_filtered_out() {
    let day_list = vec![
        record(
            1,
            "Foo",
            vec![category(
                "Categoria:Cancellazioni del 4 maggio 2018",
                "Foo",
                "2018-05-04T09:41:00Z",
            )],
        ),
        // Surfaced by a query anchored on the adjacent day.
        record(
            2,
            "Bar",
            vec![category(
                "Categoria:Cancellazioni del 5 maggio 2018",
                "Bar",
                "2018-05-05T09:41:00Z",
            )],
        ),
    ];

    let wiki = wiki_with_history(&[1, 2]);
    let result = classify_day(
        date(2018, 5, 4),
        vec![(CategoryKind::Day, day_list)],
        &wiki,
    )
    .await
    .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.by_kind[&CategoryKind::Day][0].id(), 1);
    // The raw counts still reflect everything that was fetched.
    assert_eq!(result.raw_counts[&CategoryKind::Day], 2);
}

#[tokio::test]
async fn entities_are_sorted_by_creation_date() {
    let day_list = vec![
        record(
            1,
            "Foo",
            vec![category(
                "Categoria:Cancellazioni del 4 maggio 2018",
                "Foo",
                // Disagrees with the category day: forces the lazy fetch.
                "2018-05-06T09:41:00Z",
            )],
        ),
        record(
            2,
            "Bar",
            vec![category(
                "Categoria:Cancellazioni del 4 maggio 2018",
                "Bar",
                "2018-05-04T06:00:00Z",
            )],
        ),
    ];

    let wiki = LocalWiki::new();
    // Page 1 was actually created before page 2's categorization instant.
    wiki.set_creation_date(1, instant(2018, 5, 4, 5));
    wiki.set_lastedit_date(1, instant(2018, 5, 11, 5));
    wiki.set_lastedit_date(2, instant(2018, 5, 11, 6));

    let result = classify_day(
        date(2018, 5, 4),
        vec![(CategoryKind::Day, day_list)],
        &wiki,
    )
    .await
    .unwrap();

    let ids: Vec<_> = result.by_kind[&CategoryKind::Day]
        .iter()
        .map(|pdc| pdc.id())
        .collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn subject_themes_are_scraped_during_population() {
    let day_list = vec![record(
        1,
        "Foo",
        vec![category(
            "Categoria:Cancellazioni del 4 maggio 2018",
            "Foo",
            "2018-05-04T09:41:00Z",
        )],
    )];

    let wiki = wiki_with_history(&[1]);
    wiki.set_wikitext("Foo", "{{cancellazione|9|arg=Software libero|argomento2=LGBT}}");

    let result = classify_day(
        date(2018, 5, 4),
        vec![(CategoryKind::Day, day_list)],
        &wiki,
    )
    .await
    .unwrap();

    let pdc = &result.by_kind[&CategoryKind::Day][0];
    assert_eq!(
        pdc.subject_themes(),
        &["Software libero".to_string(), "LGBT".to_string()]
    );
}

#[tokio::test]
async fn missing_subject_page_yields_no_themes() {
    let day_list = vec![record(
        1,
        "Foo",
        vec![category(
            "Categoria:Cancellazioni del 4 maggio 2018",
            "Foo",
            "2018-05-04T09:41:00Z",
        )],
    )];

    let wiki = wiki_with_history(&[1]);

    let result = classify_day(
        date(2018, 5, 4),
        vec![(CategoryKind::Day, day_list)],
        &wiki,
    )
    .await
    .unwrap();

    assert!(result.by_kind[&CategoryKind::Day][0].subject_themes().is_empty());
}

#[tokio::test]
async fn malformed_records_are_dropped_not_fatal() {
    let broken = RawPageRecord {
        page_id: None,
        title: Some("Wikipedia:Pagine da cancellare/Rotto".to_string()),
        length: Some(100),
        touched: Some("2018-05-05T00:00:00Z".to_string()),
        protection: Some(vec![]),
        categories: Some(vec![]),
    };
    let good = record(
        1,
        "Foo",
        vec![category(
            "Categoria:Cancellazioni del 4 maggio 2018",
            "Foo",
            "2018-05-04T09:41:00Z",
        )],
    );

    let wiki = wiki_with_history(&[1]);
    let result = classify_day(
        date(2018, 5, 4),
        vec![(CategoryKind::Day, vec![broken, good])],
        &wiki,
    )
    .await
    .unwrap();

    assert_eq!(result.len(), 1);
    // Dropped records still count as fetched.
    assert_eq!(result.raw_counts[&CategoryKind::Day], 2);
}

#[tokio::test]
async fn non_pdc_titles_abort_the_pass() {
    let wrong = RawPageRecord {
        page_id: Some(9),
        title: Some("Utente:Qualcuno/Sandbox".to_string()),
        length: Some(100),
        touched: Some("2018-05-05T00:00:00Z".to_string()),
        protection: Some(vec![]),
        categories: Some(vec![category(
            "Categoria:Cancellazioni del 4 maggio 2018",
            "Sandbox",
            "2018-05-04T09:41:00Z",
        )]),
    };

    let wiki = LocalWiki::new();
    let result = classify_day(
        date(2018, 5, 4),
        vec![(CategoryKind::Day, vec![wrong])],
        &wiki,
    )
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn protected_running_pdc_is_reported_as_ended() {
    let mut raw = record(
        1,
        "Foo",
        vec![
            category(
                "Categoria:Cancellazioni del 4 maggio 2018",
                "Foo",
                "2018-05-04T09:41:00Z",
            ),
            category(
                "Categoria:Procedure di cancellazione in corso",
                "Foo",
                "2018-05-04T09:41:00Z",
            ),
        ],
    );
    raw.protection = Some(vec![RawProtection {
        kind: "edit".to_string(),
        level: "sysop".to_string(),
        expiry: None,
    }]);

    let wiki = wiki_with_history(&[1]);
    let result = classify_day(
        date(2018, 5, 4),
        vec![(CategoryKind::Day, vec![raw])],
        &wiki,
    )
    .await
    .unwrap();

    assert_eq!(result.running().count(), 0);
    assert_eq!(result.ended().count(), 1);
}

#[tokio::test]
async fn empty_lists_report_zero_raw_counts() {
    let wiki = LocalWiki::new();
    let grouped = CategoryKind::all()
        .into_iter()
        .map(|kind| (kind, Vec::new()))
        .collect();

    let result = classify_day(date(2018, 5, 4), grouped, &wiki).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(result.raw_counts.len(), 5);
    assert!(result.raw_counts.values().all(|&count| count == 0));
}
