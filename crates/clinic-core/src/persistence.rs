//! 平面文件持久化
//!
//! 每个实体或队列对应一个带表头的CSV文件。每次变更后整文件重写，
//! 启动时整文件重新加载，没有增量日志。

use crate::csv::{join_record, parse_document};
use crate::error::{ClinicError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 带固定表头的CSV数据文件
#[derive(Debug, Clone)]
pub struct FlatFile {
    path: PathBuf,
    header: &'static str,
}

impl FlatFile {
    pub fn new(path: impl Into<PathBuf>, header: &'static str) -> Self {
        Self {
            path: path.into(),
            header,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取所有数据行（不含表头）
    ///
    /// 文件不存在或无法读取时视为空集合，只记录日志不报错。
    pub fn load_rows(&self) -> Vec<Vec<String>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Data file {} not found, starting empty", self.path.display());
                return Vec::new();
            }
            Err(e) => {
                warn!(
                    "Failed to read data file {}: {}, starting empty",
                    self.path.display(),
                    e
                );
                return Vec::new();
            }
        };

        let text = String::from_utf8_lossy(&bytes);
        let mut rows = parse_document(&text);
        if rows.is_empty() {
            return rows;
        }

        // 第一行总是表头
        let header = rows.remove(0);
        if header.join(",") != self.header {
            warn!(
                "Unexpected header in {}: {:?}",
                self.path.display(),
                header.join(",")
            );
        }

        debug!("Loaded {} rows from {}", rows.len(), self.path.display());
        rows
    }

    /// 用给定的数据行整文件重写
    ///
    /// 先写同目录的临时文件再改名覆盖目标文件。
    pub fn rewrite<I>(&self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| ClinicError::io(parent, e))?;
            }
        }

        let mut content = String::from(self.header);
        content.push('\n');
        let mut count = 0usize;
        for row in rows {
            content.push_str(&join_record(&row));
            content.push('\n');
            count += 1;
        }

        let tmp_path = self.tmp_path();
        let written = fs::File::create(&tmp_path)
            .and_then(|mut file| {
                file.write_all(content.as_bytes())?;
                file.sync_all()
            })
            .map_err(|e| ClinicError::io(&tmp_path, e))
            .and_then(|_| fs::rename(&tmp_path, &self.path).map_err(|e| ClinicError::io(&self.path, e)));
        if let Err(e) = written {
            // 失败时不留下临时文件
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        debug!("Rewrote {} with {} rows", self.path.display(), count);
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "ID,Name,Notes";

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = FlatFile::new(dir.path().join("absent.csv"), HEADER);
        assert!(file.load_rows().is_empty());
    }

    #[test]
    fn test_rewrite_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = FlatFile::new(dir.path().join("nested").join("people.csv"), HEADER);

        let rows = vec![
            row(&["1", "Ann", "allergic, penicillin"]),
            row(&["2", "Bob", "said \"fine\""]),
        ];
        file.rewrite(rows.clone()).unwrap();

        let text = fs::read_to_string(file.path()).unwrap();
        assert!(text.starts_with("ID,Name,Notes\n"));
        assert_eq!(file.load_rows(), rows);
        assert!(!dir.path().join("nested").join("people.csv.tmp").exists());
    }

    #[test]
    fn test_rewrite_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let file = FlatFile::new(dir.path().join("people.csv"), HEADER);

        file.rewrite(vec![row(&["1", "Ann", ""]), row(&["2", "Bob", ""])]).unwrap();
        file.rewrite(vec![row(&["2", "Bob", ""])]).unwrap();

        assert_eq!(file.load_rows(), vec![row(&["2", "Bob", ""])]);
    }

    #[test]
    fn test_rewrite_surfaces_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // 目标路径是一个已存在的目录，改名必然失败
        let target = dir.path().join("occupied");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("child"), "x").unwrap();

        let file = FlatFile::new(&target, HEADER);
        let err = file.rewrite(Vec::<Vec<String>>::new()).unwrap_err();
        assert!(matches!(err, ClinicError::Io { .. }));
        assert!(!dir.path().join("occupied.tmp").exists());
    }
}
