use std::fmt::Display;

/// 半开索引区间 `[start, end)`，检查点的基本单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatchRange {
    pub start: usize,
    pub end: usize,
}

impl BatchRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 把区间切分为宽度为 `width` 的连续批次，最后一批可以更窄
    ///
    /// 批次边界从 `start` 起算，因此同一配置下的切分结果总是相同的。
    pub fn split(&self, width: usize) -> Vec<BatchRange> {
        let width = width.max(1);
        (self.start..self.end)
            .step_by(width)
            .map(|s| BatchRange::new(s, (s + width).min(self.end)))
            .collect()
    }
}

impl Display for BatchRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
