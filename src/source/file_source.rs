// ==========================================
// 针织车间停机统计系统 - 分隔符日志文件事件源
// ==========================================
// 文件: <dir>/<d.M.yyyy> All Machines Knitting MCs Fault Log.csv（每日一个）
// 编码: UTF-16（带 BOM）或 UTF-8
// 结构: 可选 "sep=;" 行 → 表头行 → 数据行（;分隔,列序同机台推送格式）
// 红线: 单行格式错误跳过并告警,不得中止整份报表
// ==========================================

use crate::domain::{FaultEvent, FaultLogLine, ShiftWindow};
use crate::source::{EventSource, SourceError, SourceResult};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// 日志文件名格式（chrono 格式串）
pub const FAULT_LOG_FILE_PATTERN: &str = "%-d.%-m.%Y All Machines Knitting MCs Fault Log.csv";

// ==========================================
// DelimitedFileEventSource
// ==========================================
pub struct DelimitedFileEventSource {
    dir: PathBuf,
}

impl DelimitedFileEventSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// 指定日期的日志文件路径
    pub fn file_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(date.format(FAULT_LOG_FILE_PATTERN).to_string())
    }

    /// 读取单日文件中的全部可解析事件
    ///
    /// # 返回
    /// - Ok(vec): 文件不存在时为空（当日无停机记录）
    /// - Err(SourceError::Unavailable): 文件存在但无法读取
    fn read_day(&self, date: NaiveDate) -> SourceResult<Vec<FaultEvent>> {
        let path = self.file_for(date);
        if !path.exists() {
            debug!(path = %path.display(), "日志文件不存在,视为无记录");
            return Ok(Vec::new());
        }

        let bytes = fs::read(&path)
            .map_err(|e| SourceError::Unavailable(format!("{}: {}", path.display(), e)))?;
        let text = decode_text(&bytes);
        Ok(parse_fault_log(&text, &path.display().to_string()))
    }
}

impl EventSource for DelimitedFileEventSource {
    fn name(&self) -> &'static str {
        "delimited-file"
    }

    #[instrument(skip(self, window), fields(date = %window.date, shift = %window.shift))]
    fn fetch(&self, window: &ShiftWindow, machine: Option<u32>) -> SourceResult<Vec<FaultEvent>> {
        let mut events = Vec::new();

        // 夜班跨零点,需要读取两天的文件
        for day in window.calendar_dates() {
            for event in self.read_day(day)? {
                if machine.is_some_and(|m| event.machine_number != m) {
                    continue;
                }
                let in_window = match event.occurred_at {
                    Some(ts) => window.contains(ts),
                    // 无时间戳的行只归属到班次所属日期的文件
                    None => day == window.date,
                };
                if in_window {
                    events.push(event);
                }
            }
        }

        debug!(count = events.len(), "日志文件事件读取完成");
        Ok(events)
    }
}

/// 按 BOM 识别编码（Windows 导出的日志为 UTF-16LE）
fn decode_text(bytes: &[u8]) -> String {
    let utf16 = |bytes: &[u8], le: bool| -> String {
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| {
                if le {
                    u16::from_le_bytes([pair[0], pair[1]])
                } else {
                    u16::from_be_bytes([pair[0], pair[1]])
                }
            })
            .collect();
        String::from_utf16_lossy(&units)
    };

    match bytes {
        [0xFF, 0xFE, rest @ ..] => utf16(rest, true),
        [0xFE, 0xFF, rest @ ..] => utf16(rest, false),
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// 解析整份日志文本,坏行跳过
fn parse_fault_log(text: &str, origin: &str) -> Vec<FaultEvent> {
    // 去掉 Excel 风格的分隔符声明行
    let body = match text.split_once('\n') {
        Some((first, rest)) if first.trim().to_ascii_lowercase().starts_with("sep=") => rest,
        _ => text,
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true) // 允许行长度不一致
        .from_reader(body.as_bytes());

    let mut events = Vec::new();
    let mut skipped = 0usize;
    for (row_idx, result) in reader.records().enumerate() {
        // 行号从数据第一行起算,+2 对应表头与 1 基行号
        let line = row_idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(origin, line, error = %e, "日志行读取失败,已跳过");
                skipped += 1;
                continue;
            }
        };

        // 跳过完全空白的行
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }

        let columns: Vec<&str> = record.iter().collect();
        let parsed = FaultLogLine::from_columns(&columns)
            .map(FaultLogLine::into_event)
            .or_else(|err| FaultLogLine::undated_event(&columns).map_err(|_| err));

        match parsed {
            Ok(event) => events.push(event),
            Err(err) => {
                let malformed = SourceError::malformed(line, &err);
                warn!(origin, error = %malformed, "日志行格式错误,已跳过");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(origin, skipped, parsed = events.len(), "日志文件存在被跳过的行");
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ShiftLabel;
    use crate::engine::ShiftWindowResolver;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = "Date;Code;Fault;Operator No;Operator;Fault Time;Machine";

    fn write_utf16_file(dir: &Path, date: NaiveDate, lines: &[&str]) {
        let source = DelimitedFileEventSource::new(dir);
        let mut file = fs::File::create(source.file_for(date)).unwrap();
        let text = lines.join("\r\n");
        let mut bytes = vec![0xFF, 0xFE];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        file.write_all(&bytes).unwrap();
    }

    fn window(date: NaiveDate, shift: ShiftLabel) -> ShiftWindow {
        let now = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        ShiftWindowResolver::new().resolve_parsed(date, shift, now)
    }

    #[test]
    fn test_file_name_pattern() {
        let source = DelimitedFileEventSource::new("data");
        let path = source.file_for(NaiveDate::from_ymd_opt(2024, 7, 4).unwrap());
        assert_eq!(
            path,
            Path::new("data").join("4.7.2024 All Machines Knitting MCs Fault Log.csv")
        );
    }

    #[test]
    fn test_reads_utf16_and_skips_bad_lines() {
        let dir = TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 7, 4).unwrap();
        write_utf16_file(
            dir.path(),
            date,
            &[
                "sep=;",
                HEADER,
                "04/07/2024 07:00:00;1;Standing;10;Alice;0:10:00;3",
                "04/07/2024 08:00:00;1;Standing;10;Alice;garbage;3",
                "04/07/2024 09:00:00;2;False Stop;10;Alice;0:05:00;17",
                "04/07/2024 18:00:00;2;False Stop;10;Alice;0:05:00;3",
                ";;;;;;",
            ],
        );

        let source = DelimitedFileEventSource::new(dir.path());
        let events = source.fetch(&window(date, ShiftLabel::Day), None).unwrap();

        // 坏行被跳过, 18:00 属于夜班
        assert_eq!(events.len(), 2);
        let machine3 = source.fetch(&window(date, ShiftLabel::Day), Some(3)).unwrap();
        assert_eq!(machine3.len(), 1);
        assert_eq!(machine3[0].duration.as_secs(), 600);
    }

    #[test]
    fn test_night_shift_spans_two_files() {
        let dir = TempDir::new().unwrap();
        let day1 = NaiveDate::from_ymd_opt(2024, 7, 4).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2024, 7, 5).unwrap();
        write_utf16_file(
            dir.path(),
            day1,
            &[HEADER, "04/07/2024 23:00:00;1;Standing;10;Alice;0:10:00;3"],
        );
        write_utf16_file(
            dir.path(),
            day2,
            &[
                HEADER,
                "05/07/2024 05:59:59;1;Standing;10;Alice;0:20:00;3",
                "05/07/2024 06:00:00;1;Standing;10;Alice;0:30:00;3",
            ],
        );

        let source = DelimitedFileEventSource::new(dir.path());
        let events = source.fetch(&window(day1, ShiftLabel::Night), None).unwrap();
        let total: u64 = events.iter().map(|e| e.duration.as_secs()).sum();
        assert_eq!(events.len(), 2);
        assert_eq!(total, 30 * 60);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let source = DelimitedFileEventSource::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2024, 7, 4).unwrap();
        let events = source.fetch(&window(date, ShiftLabel::Day), None).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_undated_rows_belong_to_shift_date() {
        let text = format!("{}\n;1;Standing;10;Alice;0:01:00;3\n", HEADER);
        let events = parse_fault_log(&text, "inline");
        assert_eq!(events.len(), 1);
        assert!(events[0].occurred_at.is_none());
    }

    #[test]
    fn test_overflowing_fault_time_row_is_skipped() {
        let text = format!(
            "{}\n04/07/2024 07:00:00;1;Standing;10;Alice;9999999999999999:00:00;3\n04/07/2024 08:00:00;1;Standing;10;Alice;0:02:00;3\n",
            HEADER
        );
        let events = parse_fault_log(&text, "inline");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].duration.as_secs(), 120);
    }
}
