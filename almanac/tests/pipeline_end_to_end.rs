//! End-to-end pipeline tests over the saved upstream fixture.
//!
//! Uses scripted fetchers from `almanac::test_support`; no network access.

use almanac::core::types::{OutputFormat, ResultData};
use almanac::io::config::AlmanacConfig;
use almanac::io::fetch::FileFetcher;
use almanac::pipeline::Pipeline;
use almanac::test_support::{FailingFetcher, SAMPLE_DATE, StaticFetcher, sample_record_path};
use serde_json::json;

fn default_pipeline() -> Pipeline {
    Pipeline::from_config(&AlmanacConfig::default())
}

#[test]
fn default_fields_are_translated_with_void_branches() {
    let result = default_pipeline()
        .with_format(OutputFormat::Json)
        .process(&StaticFetcher::sample(), SAMPLE_DATE);

    assert_eq!(result.status, 200);
    let ResultData::Record(record) = result.data else {
        panic!("expected structured record, got {:?}", result.data);
    };
    assert_eq!(
        record,
        json!({
            "农历": {
                "年": 2024,
                "月": 11,
                "日": 26,
                "农历月": "冬",
                "农历日": "廿六"
            },
            "干支": {"年": "甲辰", "月": "丙子", "日": "甲子"},
            "基本信息": {
                "星期": "星期四",
                "年纳音": "覆灯火",
                "月纳音": "涧下水",
                "日纳音": "海中金",
                "冲煞": "冲马(戊午)煞南",
                "冲生肖": "马",
                "煞方": "南"
            },
            "额外补充": {
                "吉神宜趋": ["天恩", "母仓", "时阳"],
                "二十八星宿": "危",
                "星宿吉凶": "凶",
                "建除十二神": "破",
                "六曜": "先负",
                "凶煞宜忌": ["月破", "大耗", "灾煞"]
            },
            "空亡": "戌亥"
        })
    );
    assert!(record.get("生肖").is_none());
    assert!(record.get("公历").is_none());
}

#[test]
fn default_fields_render_as_plaintext() {
    let result = default_pipeline().process(&StaticFetcher::sample(), SAMPLE_DATE);

    assert_eq!(result.status, 200);
    let ResultData::Text(text) = result.data else {
        panic!("expected text, got {:?}", result.data);
    };
    assert!(text.starts_with("农历: 年: 2024,\n月: 11,\n"));
    assert!(text.contains("干支: 年: 甲辰,\n月: 丙子,\n日: 甲子"));
    assert!(text.contains("吉神宜趋: 天恩 母仓 时阳"));
    assert!(text.ends_with("空亡: 戌亥"));
    assert!(!text.contains("生肖"));
}

#[test]
fn saved_response_file_matches_static_fetcher() {
    let pipeline = default_pipeline();
    let from_file = pipeline.process(&FileFetcher::new(sample_record_path()), SAMPLE_DATE);
    let from_memory = pipeline.process(&StaticFetcher::sample(), SAMPLE_DATE);
    assert_eq!(from_file, from_memory);
}

#[test]
fn fetch_failure_becomes_uniform_error_result() {
    let fetcher = FailingFetcher::new(502, "bad gateway");
    let result = default_pipeline().process(&fetcher, SAMPLE_DATE);

    assert_eq!(result.status, 400);
    let detail = result.error().expect("error detail");
    assert_eq!(detail.error, "Failed to retrieve data");
    assert!(detail.details.contains("502"));
    assert!(detail.details.contains("bad gateway"));
}

#[test]
fn invalid_date_fails_before_fetching() {
    let fetcher = FailingFetcher::new(500, "must not be called");
    let result = default_pipeline().process(&fetcher, "26/12/2024");

    assert_eq!(result.status, 400);
    let detail = result.error().expect("error detail");
    assert!(detail.details.contains("26/12/2024"));
    assert!(!detail.details.contains("must not be called"));
}

#[test]
fn corrupted_day_pillar_becomes_error_result() {
    let mut record = almanac::test_support::sample_record();
    record["ganZhi"]["day"] = json!("甲");
    let result = default_pipeline().process(&StaticFetcher::new(record), SAMPLE_DATE);

    assert_eq!(result.status, 400);
    let detail = result.error().expect("error detail");
    assert!(detail.details.contains("invalid stem-branch code"));
}
