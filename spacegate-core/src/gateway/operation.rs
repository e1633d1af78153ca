//! Models, operations and the allow-list between them

use super::error::GatewayError;
use std::fmt;
use std::str::FromStr;

/// Models reachable through the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelName {
    Space,
    SpaceUser,
}

impl ModelName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelName::Space => "space",
            ModelName::SpaceUser => "spaceUser",
        }
    }

    /// Operations this model exposes
    pub fn allowed_operations(&self) -> Vec<Operation> {
        Target::ALL
            .iter()
            .filter(|t| t.model() == *self)
            .map(Target::operation)
            .collect()
    }

    pub fn allows(&self, operation: Operation) -> bool {
        Target::new(*self, operation).is_some()
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelName {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "space" => Ok(ModelName::Space),
            "spaceUser" => Ok(ModelName::SpaceUser),
            other => Err(GatewayError::UnknownModel(other.to_string())),
        }
    }
}

/// Data operations the gateway understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    FindUnique,
    FindFirst,
    FindMany,
    Count,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::FindUnique => "findUnique",
            Operation::FindFirst => "findFirst",
            Operation::FindMany => "findMany",
            Operation::Count => "count",
        }
    }

    /// Mutations arrive as POST bodies, reads as GET `?q=`
    pub fn is_mutation(&self) -> bool {
        matches!(self, Operation::Create)
    }

    fn parse(s: &str) -> Option<Self> {
        let op = match s {
            "create" => Operation::Create,
            "findUnique" => Operation::FindUnique,
            "findFirst" => Operation::FindFirst,
            "findMany" => Operation::FindMany,
            "count" => Operation::Count,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The allow-list: every `(model, operation)` pair the gateway serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    SpaceCreate,
    SpaceFindUnique,
    SpaceFindFirst,
    SpaceFindMany,
    SpaceCount,
    SpaceUserFindMany,
    SpaceUserCount,
}

impl Target {
    pub const ALL: [Target; 7] = [
        Target::SpaceCreate,
        Target::SpaceFindUnique,
        Target::SpaceFindFirst,
        Target::SpaceFindMany,
        Target::SpaceCount,
        Target::SpaceUserFindMany,
        Target::SpaceUserCount,
    ];

    /// `None` when the model does not expose the operation
    pub fn new(model: ModelName, operation: Operation) -> Option<Self> {
        use ModelName::*;
        use Operation::*;

        let target = match (model, operation) {
            (Space, Create) => Target::SpaceCreate,
            (Space, FindUnique) => Target::SpaceFindUnique,
            (Space, FindFirst) => Target::SpaceFindFirst,
            (Space, FindMany) => Target::SpaceFindMany,
            (Space, Count) => Target::SpaceCount,
            (SpaceUser, FindMany) => Target::SpaceUserFindMany,
            (SpaceUser, Count) => Target::SpaceUserCount,
            (SpaceUser, Create | FindUnique | FindFirst) => return None,
        };
        Some(target)
    }

    /// Resolve path segments against the allow-list
    pub fn resolve(model: &str, operation: &str) -> Result<Self, GatewayError> {
        let model: ModelName = model.parse()?;
        Operation::parse(operation)
            .and_then(|op| Target::new(model, op))
            .ok_or_else(|| GatewayError::OperationNotAllowed {
                model: model.as_str(),
                operation: operation.to_string(),
            })
    }

    pub fn model(&self) -> ModelName {
        match self {
            Target::SpaceCreate
            | Target::SpaceFindUnique
            | Target::SpaceFindFirst
            | Target::SpaceFindMany
            | Target::SpaceCount => ModelName::Space,
            Target::SpaceUserFindMany | Target::SpaceUserCount => ModelName::SpaceUser,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Target::SpaceCreate => Operation::Create,
            Target::SpaceFindUnique => Operation::FindUnique,
            Target::SpaceFindFirst => Operation::FindFirst,
            Target::SpaceFindMany | Target::SpaceUserFindMany => Operation::FindMany,
            Target::SpaceCount | Target::SpaceUserCount => Operation::Count,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.model(), self.operation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list() {
        assert!(Target::resolve("space", "create").is_ok());
        assert!(Target::resolve("space", "findUnique").is_ok());
        assert!(Target::resolve("spaceUser", "findMany").is_ok());
        assert!(Target::resolve("spaceUser", "count").is_ok());

        assert!(matches!(
            Target::resolve("spaceUser", "create"),
            Err(GatewayError::OperationNotAllowed { .. })
        ));
    }

    #[test]
    fn test_unknown_model() {
        assert!(matches!(
            Target::resolve("user", "findMany"),
            Err(GatewayError::UnknownModel(m)) if m == "user"
        ));
        // model names are case sensitive
        assert!(Target::resolve("Space", "create").is_err());
    }

    #[test]
    fn test_unknown_operation_is_not_allowed() {
        for op in ["delete", "deleteMany", "update", "upsert", "aggregate", ""] {
            assert!(matches!(
                Target::resolve("space", op),
                Err(GatewayError::OperationNotAllowed { .. })
            ));
        }
    }

    #[test]
    fn test_only_create_is_mutation() {
        assert!(Operation::Create.is_mutation());
        assert!(!Operation::FindMany.is_mutation());
        assert!(!Operation::Count.is_mutation());
    }

    #[test]
    fn test_every_target_round_trips_through_resolve() {
        for target in Target::ALL {
            let resolved =
                Target::resolve(target.model().as_str(), target.operation().as_str()).unwrap();
            assert_eq!(resolved, target);
        }
        assert_eq!(
            ModelName::SpaceUser.allowed_operations(),
            vec![Operation::FindMany, Operation::Count]
        );
        assert!(!ModelName::SpaceUser.allows(Operation::Create));
    }

    #[test]
    fn test_target_display() {
        let target = Target::resolve("spaceUser", "count").unwrap();
        assert_eq!(target.to_string(), "spaceUser.count");
    }
}
