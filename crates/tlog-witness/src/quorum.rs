//! Quorum expressions over witness identities

use std::collections::HashSet;

/// A node in a quorum expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyNode {
    /// Satisfied when the named witness has a verified cosignature
    Witness(String),
    /// Satisfied when at least `required` children are satisfied
    Threshold {
        name: String,
        required: usize,
        children: Vec<PolicyNode>,
    },
}

impl PolicyNode {
    pub fn witness(name: impl Into<String>) -> Self {
        PolicyNode::Witness(name.into())
    }

    pub fn threshold(name: impl Into<String>, required: usize, children: Vec<PolicyNode>) -> Self {
        PolicyNode::Threshold {
            name: name.into(),
            required,
            children,
        }
    }

    /// Name of the witness or group this node stands for
    pub fn name(&self) -> &str {
        match self {
            PolicyNode::Witness(name) => name,
            PolicyNode::Threshold { name, .. } => name,
        }
    }

    /// Evaluate bottom-up against the set of witnesses with verified cosignatures
    pub fn is_satisfied(&self, verified: &HashSet<&str>) -> bool {
        match self {
            PolicyNode::Witness(name) => verified.contains(name.as_str()),
            PolicyNode::Threshold {
                required, children, ..
            } => {
                children
                    .iter()
                    .filter(|child| child.is_satisfied(verified))
                    .take(*required)
                    .count()
                    >= *required
            }
        }
    }

    /// All witness names referenced below this node
    pub fn witnesses(&self) -> Vec<&str> {
        match self {
            PolicyNode::Witness(name) => vec![name.as_str()],
            PolicyNode::Threshold { children, .. } => {
                children.iter().flat_map(|c| c.witnesses()).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_of_three() -> PolicyNode {
        PolicyNode::threshold(
            "g",
            2,
            vec![
                PolicyNode::witness("A"),
                PolicyNode::witness("B"),
                PolicyNode::witness("C"),
            ],
        )
    }

    #[test]
    fn test_threshold() {
        let policy = two_of_three();
        let set = |names: &[&'static str]| names.iter().copied().collect::<HashSet<&str>>();
        assert!(policy.is_satisfied(&set(&["A", "B"])));
        assert!(policy.is_satisfied(&set(&["A", "C"])));
        assert!(policy.is_satisfied(&set(&["A", "B", "C"])));
        assert!(!policy.is_satisfied(&set(&["A"])));
        assert!(!policy.is_satisfied(&set(&[])));
        assert!(!policy.is_satisfied(&set(&["A", "D"])));
    }

    #[test]
    fn test_nested_groups() {
        // all of (any of A, B) and C
        let policy = PolicyNode::threshold(
            "outer",
            2,
            vec![
                PolicyNode::threshold(
                    "inner",
                    1,
                    vec![PolicyNode::witness("A"), PolicyNode::witness("B")],
                ),
                PolicyNode::witness("C"),
            ],
        );
        let set = |names: &[&'static str]| names.iter().copied().collect::<HashSet<&str>>();
        assert!(policy.is_satisfied(&set(&["B", "C"])));
        assert!(!policy.is_satisfied(&set(&["A", "B"])));
        assert_eq!(policy.witnesses(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_zero_threshold_is_trivially_satisfied() {
        let policy = PolicyNode::threshold("empty", 0, vec![]);
        assert!(policy.is_satisfied(&HashSet::new()));
    }
}
