/// Default furniture markers; matching labels are never devices
pub const DEFAULT_FURNITURE_MARKERS: &[&str] = &["mobilier", "furniture"];

/// Default tokens marking a secondary output channel of an already listed device
pub const DEFAULT_EXCLUDED_TOKENS: &[&str] = &["_out2"];

/// Substring blocklist applied to element labels, case-insensitively
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFilter {
    furniture_markers: Vec<String>,
    excluded_tokens: Vec<String>,
}

/// Why a label was filtered out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelBlock {
    Furniture(String),
    SecondaryChannel(String),
}

impl LabelFilter {
    pub fn new<M, T>(furniture_markers: M, excluded_tokens: T) -> Self
    where
        M: IntoIterator,
        M::Item: AsRef<str>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        Self {
            furniture_markers: normalize_tokens(furniture_markers),
            excluded_tokens: normalize_tokens(excluded_tokens),
        }
    }

    /// Filter that lets every label through.
    pub fn permissive() -> Self {
        Self::new(Vec::<String>::new(), Vec::<String>::new())
    }

    pub fn furniture_markers(&self) -> &[String] {
        &self.furniture_markers
    }

    pub fn excluded_tokens(&self) -> &[String] {
        &self.excluded_tokens
    }

    /// Returns the first matching token, if the label is blocked.
    pub fn check(&self, label: &str) -> Option<LabelBlock> {
        let lowered = label.to_lowercase();
        if let Some(marker) = self
            .furniture_markers
            .iter()
            .find(|marker| lowered.contains(marker.as_str()))
        {
            return Some(LabelBlock::Furniture(marker.clone()));
        }
        self.excluded_tokens
            .iter()
            .find(|token| lowered.contains(token.as_str()))
            .map(|token| LabelBlock::SecondaryChannel(token.clone()))
    }
}

impl Default for LabelFilter {
    fn default() -> Self {
        Self::new(DEFAULT_FURNITURE_MARKERS, DEFAULT_EXCLUDED_TOKENS)
    }
}

fn normalize_tokens<I>(tokens: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|token| token.as_ref().trim().to_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}
