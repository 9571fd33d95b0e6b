//! 커서 저장소 재생 시나리오 테스트.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use dryback_data::{CursorError, DecodeError, RowCursorStore};

fn row(open_time: i64) -> String {
    format!(
        "{},10,11,9,10.5,100,{},1050,5,50,525,0",
        open_time,
        open_time + 999
    )
}

fn write_rows(dir: &Path, name: &str, rows: &[String]) {
    let mut content = rows.join("\n");
    content.push('\n');
    std::fs::write(dir.join(name), content).unwrap();
}

#[tokio::test]
async fn test_three_rows_exhaust_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    write_rows(dir.path(), "BTCUSDT_1m.csv", &[row(1000), row(2000), row(3000)]);
    let store = RowCursorStore::new(dir.path());

    for expected in [1000, 2000, 3000] {
        let kline = store.next_record("BTCUSDT_1m.csv").await.unwrap();
        assert_eq!(kline.open_time, expected);
        assert_eq!(kline.close_time, expected + 999);
    }

    // 소진 이후에도 계속 소진
    for _ in 0..2 {
        assert!(matches!(
            store.next_record("BTCUSDT_1m.csv").await,
            Err(CursorError::Exhausted(_))
        ));
    }
    assert_eq!(store.offset("BTCUSDT_1m.csv").await, Some(3));

    assert!(store.reset("BTCUSDT_1m.csv").await);
    let kline = store.next_record("BTCUSDT_1m.csv").await.unwrap();
    assert_eq!(kline.open_time, 1000);
}

#[tokio::test]
async fn test_decode_failure_repeats_until_file_is_fixed() {
    let dir = tempfile::tempdir().unwrap();
    let broken = "2000,abc,11,9,10.5,100,2999,1050,5,50,525,0".to_string();
    write_rows(dir.path(), "bad.csv", &[row(1000), broken, row(3000)]);
    let store = RowCursorStore::new(dir.path());

    assert_eq!(store.next_record("bad.csv").await.unwrap().open_time, 1000);

    for _ in 0..3 {
        match store.next_record("bad.csv").await {
            Err(CursorError::Decode { offset, source, .. }) => {
                assert_eq!(offset, 1);
                assert!(matches!(source, DecodeError::Float { index: 1, .. }));
            }
            other => panic!("expected decode error, got {other:?}"),
        }
        assert_eq!(store.offset("bad.csv").await, Some(1));
    }

    // 같은 파일을 제자리에서 고치면 열린 리더가 새 내용을 읽는다
    write_rows(dir.path(), "bad.csv", &[row(1000), row(2000), row(3000)]);
    assert_eq!(store.next_record("bad.csv").await.unwrap().open_time, 2000);
    assert_eq!(store.next_record("bad.csv").await.unwrap().open_time, 3000);
}

#[tokio::test]
async fn test_short_row_is_a_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    write_rows(dir.path(), "short.csv", &["1000,10,11".to_string()]);
    let store = RowCursorStore::new(dir.path());

    match store.next_record("short.csv").await {
        Err(CursorError::Decode { offset: 0, source, .. }) => {
            assert_eq!(
                source,
                DecodeError::Arity {
                    expected: 12,
                    found: 3
                }
            );
        }
        other => panic!("expected decode error, got {other:?}"),
    }
    assert_eq!(store.offset("short.csv").await, Some(0));
}

#[tokio::test]
async fn test_empty_file_is_exhausted_immediately() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("empty.csv"), "").unwrap();
    let store = RowCursorStore::new(dir.path());

    assert!(matches!(
        store.next_record("empty.csv").await,
        Err(CursorError::Exhausted(_))
    ));
    assert_eq!(store.offset("empty.csv").await, Some(0));
}

#[tokio::test]
async fn test_files_advance_independently() {
    let dir = tempfile::tempdir().unwrap();
    write_rows(dir.path(), "a.csv", &[row(1000), row(2000)]);
    write_rows(dir.path(), "b.csv", &[row(7000), row(8000)]);
    let store = RowCursorStore::new(dir.path());

    assert_eq!(store.next_record("a.csv").await.unwrap().open_time, 1000);
    assert_eq!(store.next_record("a.csv").await.unwrap().open_time, 2000);
    assert_eq!(store.next_record("b.csv").await.unwrap().open_time, 7000);

    store.reset("a.csv").await;
    assert_eq!(store.offset("b.csv").await, Some(1));
    assert_eq!(store.next_record("b.csv").await.unwrap().open_time, 8000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_never_duplicate_or_skip() {
    const ROWS: i64 = 200;
    const CALLERS: usize = 8;

    let dir = tempfile::tempdir().unwrap();
    let rows: Vec<String> = (1..=ROWS).map(|i| row(i * 1000)).collect();
    write_rows(dir.path(), "hot.csv", &rows);
    let store = Arc::new(RowCursorStore::new(dir.path()));

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut seen = Vec::new();
                loop {
                    match store.next_record("hot.csv").await {
                        Ok(kline) => seen.push(kline.open_time),
                        Err(CursorError::Exhausted(_)) => break,
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
                seen
            })
        })
        .collect();

    let mut all = Vec::new();
    for result in futures::future::join_all(handles).await {
        let seen = result.unwrap();
        // 각 호출자가 본 순서는 파일 순서와 같다
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        all.extend(seen);
    }

    assert_eq!(all.len(), ROWS as usize);
    let unique: HashSet<i64> = all.iter().copied().collect();
    assert_eq!(unique.len(), ROWS as usize);
    assert_eq!(store.offset("hot.csv").await, Some(ROWS as u64));
}
