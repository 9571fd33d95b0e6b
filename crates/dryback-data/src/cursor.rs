//! 데이터 파일별 순차 재생 커서 저장소.
//!
//! 각 데이터 파일마다 하나의 커서(읽기 위치 + 열린 리더)를 유지하며,
//! 요청마다 다음 레코드 하나를 반환하고 위치를 1 증가시킵니다.
//!
//! # 동작 방식
//!
//! 1. 처음 접근하는 파일은 존재 여부를 확인한 뒤 열고 offset 0으로 커서를 만듭니다.
//! 2. 리더는 열린 채로 재사용됩니다. 리더 위치가 offset과 어긋나 있으면
//!    (reset 또는 디코딩 실패 이후) 파일 처음으로 되감고 offset개 레코드를 건너뜁니다.
//! 3. 다음 레코드를 읽어 디코딩에 성공했을 때만 offset이 증가합니다.
//!    소진이나 디코딩 실패는 offset을 바꾸지 않습니다.
//!
//! # 동시성
//!
//! 파일별 `Mutex`가 "읽고 다음으로 이동"을 원자적으로 만듭니다.
//! 서로 다른 파일은 병렬로 처리되며, 파일 I/O는 블로킹 스레드 풀에서 실행됩니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use dryback_data::RowCursorStore;
//!
//! let store = RowCursorStore::new("data");
//! let first = store.next_record("BTCUSDT_1m.csv").await?;
//! store.reset("BTCUSDT_1m.csv").await;
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use csv::{Position, ReaderBuilder, StringRecord, Trim};
use dryback_core::KlineRecord;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::decoder::decode_record;
use crate::error::{CursorError, DecodeError, Result};

/// 커서 상태 스냅샷.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    /// 데이터 파일 식별자
    pub file_id: String,
    /// 지금까지 전달한 레코드 수
    pub offset: u64,
}

/// 단일 데이터 파일의 커서.
struct CursorState {
    file_id: String,
    /// 전달 완료한 레코드 수
    offset: u64,
    /// 헤더 행 수 (0 또는 1)
    header_rows: u64,
    reader: csv::Reader<File>,
    /// 리더가 파일 처음부터 소비한 행 수. `None`이면 위치를 신뢰할 수 없음.
    position: Option<u64>,
}

impl CursorState {
    fn new(file_id: &str, file: File, skip_header: bool) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(file);

        Self {
            file_id: file_id.to_string(),
            offset: 0,
            header_rows: u64::from(skip_header),
            reader,
            position: Some(0),
        }
    }

    /// offset 위치의 레코드를 읽습니다. 블로킹 I/O를 수행합니다.
    ///
    /// offset은 바꾸지 않습니다. 리더는 한 행 앞서게 되므로 offset을 올리지 않으면
    /// 다음 호출에서 되감고 같은 레코드를 다시 읽습니다.
    fn read_next(&mut self) -> Result<KlineRecord> {
        let target = self.offset + self.header_rows;

        let mut position = match self.position {
            Some(position) if position <= target => position,
            _ => self.rewind()?,
        };

        let mut record = StringRecord::new();
        while position < target {
            if !self.read(&mut record)? {
                self.position = Some(position);
                return Err(CursorError::Exhausted(self.file_id.clone()));
            }
            position += 1;
        }

        if !self.read(&mut record)? {
            self.position = Some(position);
            return Err(CursorError::Exhausted(self.file_id.clone()));
        }
        self.position = Some(position + 1);

        decode_record(&record).map_err(|source| CursorError::Decode {
            file_id: self.file_id.clone(),
            offset: self.offset,
            source,
        })
    }

    fn rewind(&mut self) -> Result<u64> {
        self.reader
            .seek(Position::new())
            .map_err(|e| self.csv_error(e))?;
        self.position = Some(0);
        debug!(file_id = %self.file_id, offset = self.offset, "Cursor rewound");
        Ok(0)
    }

    /// 레코드 하나를 읽습니다. 실패하면 리더 위치를 알 수 없는 상태로 표시합니다.
    fn read(&mut self, record: &mut StringRecord) -> Result<bool> {
        match self.reader.read_record(record) {
            Ok(has_record) => Ok(has_record),
            Err(e) => {
                self.position = None;
                Err(self.csv_error(e))
            }
        }
    }

    fn csv_error(&self, err: csv::Error) -> CursorError {
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => CursorError::io(&self.file_id, source),
            _ => CursorError::Decode {
                file_id: self.file_id.clone(),
                offset: self.offset,
                source: DecodeError::Malformed(message),
            },
        }
    }
}

/// 데이터 파일별 재생 커서 저장소.
///
/// 라우터 상태에 주입되는 명시적 인스턴스이며, 파일 식별자당 최대 하나의 커서를 가집니다.
pub struct RowCursorStore {
    data_dir: PathBuf,
    skip_header: bool,
    cursors: RwLock<HashMap<String, Arc<Mutex<CursorState>>>>,
}

impl RowCursorStore {
    /// 데이터 디렉토리를 기준으로 새 저장소를 생성합니다.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            skip_header: false,
            cursors: RwLock::new(HashMap::new()),
        }
    }

    /// 데이터 파일 첫 행을 헤더로 취급할지 설정합니다.
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.skip_header = has_headers;
        self
    }

    /// 데이터 디렉토리.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// 파일의 다음 레코드를 반환하고 offset을 1 증가시킵니다.
    ///
    /// # Errors
    /// - `SourceMissing`: 처음 접근 시 파일이 없음
    /// - `Exhausted`: 남은 레코드 없음 (offset 유지)
    /// - `Decode`: 현재 레코드 형식 오류 (offset 유지, 재시도 시 같은 오류)
    pub async fn next_record(&self, file_id: &str) -> Result<KlineRecord> {
        let slot = self.slot(file_id).await?;
        let cursor = slot.lock_owned().await;

        let outcome = tokio::task::spawn_blocking(move || {
            let mut cursor = cursor;
            let result = cursor.read_next();
            (cursor, result)
        })
        .await;

        match outcome {
            // 결과를 받은 뒤에만 offset을 올린다. 대기 중 취소되면 레코드는 소비되지 않는다.
            Ok((mut cursor, Ok(kline))) => {
                cursor.offset += 1;
                debug!(file_id, open_time = kline.open_time, "Kline replayed");
                Ok(kline)
            }
            Ok((_, Err(e))) => {
                match &e {
                    CursorError::Decode { .. } | CursorError::Io { .. } => {
                        warn!(file_id, error = %e, "Failed to read kline record")
                    }
                    _ => debug!(file_id, error = %e, "No kline served"),
                }
                Err(e)
            }
            Err(join_error) => Err(CursorError::Io {
                file_id: file_id.to_string(),
                source: std::io::Error::other(join_error.to_string()),
            }),
        }
    }

    /// 커서를 가져오거나, 처음 접근이면 파일을 열어 새로 만듭니다.
    async fn slot(&self, file_id: &str) -> Result<Arc<Mutex<CursorState>>> {
        if let Some(slot) = self.cursors.read().await.get(file_id) {
            return Ok(Arc::clone(slot));
        }

        let path = self.data_dir.join(file_id);
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| CursorError::io(file_id, e))?;
        if !metadata.is_file() {
            return Err(CursorError::SourceMissing(file_id.to_string()));
        }
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| CursorError::io(file_id, e))?
            .into_std()
            .await;

        let mut cursors = self.cursors.write().await;
        let slot = cursors.entry(file_id.to_string()).or_insert_with(|| {
            info!(file_id, path = %path.display(), "Cursor opened");
            Arc::new(Mutex::new(CursorState::new(file_id, file, self.skip_header)))
        });

        Ok(Arc::clone(slot))
    }

    /// offset을 0으로 되돌립니다. 열린 리더는 유지합니다.
    ///
    /// 한 번도 접근하지 않은 파일이면 아무것도 하지 않고 `false`를 반환합니다.
    pub async fn reset(&self, file_id: &str) -> bool {
        let Some(slot) = self.cursors.read().await.get(file_id).cloned() else {
            return false;
        };

        let mut cursor = slot.lock().await;
        let previous = cursor.offset;
        cursor.offset = 0;
        info!(file_id, previous_offset = previous, "Cursor reset");
        true
    }

    /// 커서를 제거하고 리더를 닫습니다 (reset-and-close).
    ///
    /// 다음 접근은 파일을 다시 열어 첫 레코드부터 시작합니다.
    pub async fn close(&self, file_id: &str) -> bool {
        let removed = self.cursors.write().await.remove(file_id);
        if removed.is_some() {
            info!(file_id, "Cursor closed");
        }
        removed.is_some()
    }

    /// 모든 커서를 닫고 닫은 개수를 반환합니다.
    pub async fn shutdown(&self) -> usize {
        let mut cursors = self.cursors.write().await;
        let count = cursors.len();
        cursors.clear();
        info!(count, "All cursors released");
        count
    }

    /// 현재 offset. 접근한 적 없는 파일이면 `None`.
    pub async fn offset(&self, file_id: &str) -> Option<u64> {
        let slot = self.cursors.read().await.get(file_id).cloned()?;
        let cursor = slot.lock().await;
        Some(cursor.offset)
    }

    /// 열린 커서 수.
    pub async fn open_cursors(&self) -> usize {
        self.cursors.read().await.len()
    }

    /// 모든 커서의 스냅샷 (file_id 순).
    pub async fn snapshot(&self) -> Vec<CursorSnapshot> {
        let slots: Vec<(String, Arc<Mutex<CursorState>>)> = self
            .cursors
            .read()
            .await
            .iter()
            .map(|(id, slot)| (id.clone(), Arc::clone(slot)))
            .collect();

        let mut snapshots = Vec::with_capacity(slots.len());
        for (file_id, slot) in slots {
            let offset = slot.lock().await.offset;
            snapshots.push(CursorSnapshot { file_id, offset });
        }
        snapshots.sort_by(|a, b| a.file_id.cmp(&b.file_id));
        snapshots
    }
}
