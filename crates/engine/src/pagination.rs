#[derive(Debug, Clone, Copy)]
pub struct LimitOffset {
    pub limit: i64,
    pub offset: i64,
}

impl Default for LimitOffset {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

impl LimitOffset {
    /// Keep caller-supplied paging inside sane bounds.
    pub fn clamped(self) -> Self {
        Self {
            limit: self.limit.clamp(1, 200),
            offset: self.offset.max(0),
        }
    }
}
