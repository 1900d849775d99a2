use crate::consultation::types::Specialist;

/// Ordered set of chosen specialists, keyed by id
#[derive(Debug, Clone, Default)]
pub struct SpecialistSelection {
    selected: Vec<Specialist>,
}

impl SpecialistSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the specialist if absent, removes it if present. Returns whether it
    /// is selected afterwards.
    pub fn toggle(&mut self, specialist: &Specialist) -> bool {
        if let Some(pos) = self.position(&specialist.id) {
            self.selected.remove(pos);
            false
        } else {
            self.selected.push(specialist.clone());
            true
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn selected(&self) -> &[Specialist] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Caption of the start button, e.g. "Start Consultation with 2 Specialists".
    pub fn start_label(&self) -> String {
        let count = self.len();
        format!(
            "Start Consultation with {} Specialist{}",
            count,
            if count == 1 { "" } else { "s" }
        )
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.selected.iter().position(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fallback::fallback_specialists;

    #[test]
    fn test_double_toggle_is_identity() {
        let specialists = fallback_specialists();
        let mut selection = SpecialistSelection::new();
        selection.toggle(&specialists[0]);

        let before: Vec<String> = selection.selected().iter().map(|s| s.id.clone()).collect();
        assert!(selection.toggle(&specialists[2]));
        assert!(!selection.toggle(&specialists[2]));
        let after: Vec<String> = selection.selected().iter().map(|s| s.id.clone()).collect();

        assert_eq!(before, after);
    }

    #[test]
    fn test_selection_has_no_duplicates_and_keeps_order() {
        let specialists = fallback_specialists();
        let mut selection = SpecialistSelection::new();
        selection.toggle(&specialists[3]);
        selection.toggle(&specialists[1]);
        selection.toggle(&specialists[3]);
        selection.toggle(&specialists[3]);

        let ids: Vec<&str> = selection.selected().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["cardio", "nephro"]);
        assert!(selection.is_selected("nephro"));
        assert!(!selection.is_selected("pcp"));
    }

    #[test]
    fn test_start_label() {
        let specialists = fallback_specialists();
        let mut selection = SpecialistSelection::new();
        selection.toggle(&specialists[0]);
        assert_eq!(selection.start_label(), "Start Consultation with 1 Specialist");
        selection.toggle(&specialists[1]);
        assert_eq!(selection.start_label(), "Start Consultation with 2 Specialists");
    }
}
