use crate::UploadId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermSlot {
    pub term: String,
    pub meaning: String,
}

/// Per-term definition slots, in the order the backend reported the terms.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TermDefinitions {
    slots: Vec<TermSlot>,
}

impl TermDefinitions {
    /// One empty slot per distinct term; repeated terms keep their first position.
    pub fn with_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut slots: Vec<TermSlot> = Vec::new();
        for term in terms {
            let term = term.into();
            if slots.iter().any(|slot| slot.term == term) {
                continue;
            }
            slots.push(TermSlot {
                term,
                meaning: String::new(),
            });
        }
        Self { slots }
    }

    /// Sets the meaning of a pending term. Returns false if the term is not pending.
    pub fn define(&mut self, term: &str, meaning: impl Into<String>) -> bool {
        match self.slots.iter_mut().find(|slot| slot.term == term) {
            Some(slot) => {
                slot.meaning = meaning.into();
                true
            }
            None => false,
        }
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.term.as_str())
    }

    pub fn slots(&self) -> &[TermSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn defined_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| !slot.meaning.is_empty())
            .count()
    }

    /// Consumes the slots as a submission batch, blanks included.
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.slots
            .into_iter()
            .map(|slot| (slot.term, slot.meaning))
            .collect()
    }
}

/// Terminology resolution gate in front of the analysis start.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Gate {
    #[default]
    Clear,
    Blocked {
        upload_id: UploadId,
        definitions: TermDefinitions,
    },
}

impl Gate {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Gate::Blocked { .. })
    }
}
