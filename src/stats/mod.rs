use std::fmt;

use serde::Serialize;

/// 目录索引统计（加载完成后打印，并通过 /status 暴露）
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    /// 记录数（去重后）
    pub video_count: usize,
    /// 不同 tag 数量
    pub tag_count: usize,
    /// 所有 tag 桶的 DocId 总数
    pub tag_postings_total: u64,
    /// 快照中被后续同 id 记录覆盖的条数
    pub duplicate_ids: usize,
    /// 记录字符串部分估算内存（字节）
    pub estimated_bytes: u64,
}

fn human_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;
    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

impl fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "╔══════════════════════════════════════════════════╗")?;
        writeln!(f, "║           vidcat Catalog Report                  ║")?;
        writeln!(f, "╠══════════════════════════════════════════════════╣")?;
        writeln!(f, "║   videos:       {:>10}                       ║", self.video_count)?;
        writeln!(f, "║   tags:         {:>10}                       ║", self.tag_count)?;
        writeln!(
            f,
            "║   tag postings: {:>10}                       ║",
            self.tag_postings_total
        )?;
        writeln!(f, "║   duplicate ids:{:>10}                       ║", self.duplicate_ids)?;
        writeln!(
            f,
            "║   estimated:    {:>10}                       ║",
            human_bytes(self.estimated_bytes)
        )?;
        writeln!(f, "╚══════════════════════════════════════════════════╝")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_bytes_units() {
        assert_eq!(human_bytes(12), "12 B");
        assert_eq!(human_bytes(2048), "2.00 KB");
        assert_eq!(human_bytes(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn report_mentions_counts() {
        let s = CatalogStats {
            video_count: 25,
            tag_count: 3,
            ..Default::default()
        }
        .to_string();
        assert!(s.contains("25"));
        assert!(s.contains("Catalog Report"));
    }
}
