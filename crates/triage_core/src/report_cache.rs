/// Accumulating title -> content map that renders in first-insertion order.
///
/// Re-inserting an existing title replaces its content in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportCache {
    entries: Vec<(String, String)>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, title: impl Into<String>, content: impl Into<String>) {
        let title = title.into();
        let content = content.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == title) {
            Some((_, slot)) => *slot = content,
            None => self.entries.push((title, content)),
        }
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == title)
            .map(|(_, content)| content.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(title, content)| (title.as_str(), content.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
