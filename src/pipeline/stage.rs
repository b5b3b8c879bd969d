/// Where a run currently is. `Done` and `Failed` are terminal; `Failed` is
/// reachable from every stage between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Init,
    Ingesting,
    Planning,
    Processing { groups: usize },
    Writing,
    Done,
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::Init => "init",
            Stage::Ingesting => "ingesting",
            Stage::Planning => "planning",
            Stage::Processing { .. } => "processing",
            Stage::Writing => "writing",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(&self, next: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, next),
            (Init, Ingesting)
                | (Ingesting, Planning)
                | (Planning, Processing { .. })
                | (Processing { .. }, Writing)
                | (Writing, Done)
                | (Ingesting, Failed)
                | (Planning, Failed)
                | (Processing { .. }, Failed)
                | (Writing, Failed)
        )
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_is_legal() {
        let path = [
            Stage::Init,
            Stage::Ingesting,
            Stage::Planning,
            Stage::Processing { groups: 3 },
            Stage::Writing,
            Stage::Done,
        ];
        for w in path.windows(2) {
            assert!(w[0].can_advance_to(w[1]), "{} -> {}", w[0], w[1]);
        }
    }

    #[test]
    fn terminal_stages_do_not_advance() {
        assert!(!Stage::Done.can_advance_to(Stage::Failed));
        assert!(!Stage::Failed.can_advance_to(Stage::Ingesting));
        assert!(!Stage::Init.can_advance_to(Stage::Failed));
        assert!(!Stage::Ingesting.can_advance_to(Stage::Writing));
    }
}
