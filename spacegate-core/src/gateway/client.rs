//! Identity-scoped data client
//!
//! A `ScopedClient` is built per request for one caller and applies the
//! row-level policy before anything reaches storage. Storage calls run on
//! the blocking pool.

use super::args::{
    SpaceCountArgs, SpaceCreateArgs, SpaceFindManyArgs, SpaceFindUniqueArgs, SpaceUserCountArgs,
    SpaceUserFindManyArgs,
};
use super::error::GatewayError;
use crate::core_space::{
    DataError, DataErrorKind, NewSpace, Page, Space, SpaceMember, SpaceRole, SpaceSqlStore,
};
use crate::types::UserId;
use tracing::{debug, warn};

/// Data client bound to one caller
#[derive(Clone)]
pub struct ScopedClient {
    store: SpaceSqlStore,
    user: UserId,
}

impl ScopedClient {
    pub fn new(store: SpaceSqlStore, user: UserId) -> Self {
        Self { store, user }
    }

    /// The caller this client acts for
    pub fn user(&self) -> &UserId {
        &self.user
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, DataError>
    where
        F: FnOnce(&SpaceSqlStore) -> Result<T, DataError> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| DataError::new(DataErrorKind::Query, format!("Storage task failed: {}", e)))?
    }

    /// Create a Space; the caller must be its only member, as `ADMIN`
    pub async fn create_space(&self, args: SpaceCreateArgs) -> Result<Space, DataError> {
        let new = args.into_new_space();
        self.check_create_policy(&new)?;

        let space = self.blocking(move |store| store.create_space(&new)).await?;
        debug!(user_id = %self.user, slug = %space.slug, "space created");
        Ok(space)
    }

    fn check_create_policy(&self, new: &NewSpace) -> Result<(), DataError> {
        let denied = |reason: &str| -> Result<(), DataError> {
            warn!(user_id = %self.user, slug = %new.slug, reason, "space create denied");
            Err(DataError::policy_denied(reason))
        };

        match new.members.as_slice() {
            [only] if only.user_id != self.user => {
                denied("the creator must be the only initial member")
            }
            [only] if only.role != SpaceRole::Admin => denied("the creator must join as ADMIN"),
            [_] => Ok(()),
            [] => denied("a space must be created with its creator as a member"),
            _ => denied("the creator must be the only initial member"),
        }
    }

    /// Get one visible Space by id or slug
    pub async fn find_unique_space(&self, args: SpaceFindUniqueArgs) -> Result<Space, GatewayError> {
        let key = args.filter.key()?;

        let space = self
            .blocking(move |store| store.find_space(&key))
            .await?
            .filter(|space| space.is_member(&self.user))
            .ok_or_else(|| DataError::not_found("Space"))?;
        Ok(space)
    }

    /// First visible Space matching the filter, newest first
    pub async fn find_first_space(
        &self,
        args: SpaceFindManyArgs,
    ) -> Result<Option<Space>, DataError> {
        let filter = args.filter.scoped_to(&self.user);
        let page = Page {
            take: Some(1),
            skip: args.skip.unwrap_or(0),
        };

        let spaces = self.blocking(move |store| store.find_spaces(&filter, page)).await?;
        Ok(spaces.into_iter().next())
    }

    /// Visible Spaces matching the filter, newest first
    pub async fn find_spaces(&self, args: SpaceFindManyArgs) -> Result<Vec<Space>, DataError> {
        let filter = args.filter.scoped_to(&self.user);
        let page = args.page();
        self.blocking(move |store| store.find_spaces(&filter, page)).await
    }

    pub async fn count_spaces(&self, args: SpaceCountArgs) -> Result<u64, DataError> {
        let filter = args.filter.scoped_to(&self.user);
        self.blocking(move |store| store.count_spaces(&filter)).await
    }

    /// Memberships of visible Spaces
    pub async fn find_members(
        &self,
        args: SpaceUserFindManyArgs,
    ) -> Result<Vec<SpaceMember>, DataError> {
        let filter = args.filter.scoped_to(&self.user);
        let page = args.page();
        self.blocking(move |store| store.find_members(&filter, page)).await
    }

    pub async fn count_members(&self, args: SpaceUserCountArgs) -> Result<u64, DataError> {
        let filter = args.filter.scoped_to(&self.user);
        self.blocking(move |store| store.count_members(&filter)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::args::{MemberCreateData, NestedMemberCreate, OneOrMany, SpaceWhereUnique};

    fn client(store: &SpaceSqlStore, user: &str) -> ScopedClient {
        ScopedClient::new(store.clone(), UserId::new(user))
    }

    fn create_args(members: Vec<MemberCreateData>) -> SpaceCreateArgs {
        let mut args = SpaceCreateArgs::for_creator("Acme Corp", "acme1", UserId::new("alice"));
        args.data.members = Some(NestedMemberCreate {
            create: OneOrMany::Many(members),
        });
        args
    }

    fn member(user: &str, role: SpaceRole) -> MemberCreateData {
        MemberCreateData {
            user_id: UserId::new(user),
            role,
        }
    }

    #[tokio::test]
    async fn test_create_makes_caller_admin() {
        let store = SpaceSqlStore::in_memory().unwrap();
        let alice = client(&store, "alice");

        let space = alice
            .create_space(SpaceCreateArgs::for_creator("Acme Corp", "acme1", UserId::new("alice")))
            .await
            .unwrap();

        assert_eq!(space.members.len(), 1);
        assert!(space.is_admin(alice.user()));
    }

    #[tokio::test]
    async fn test_create_policy_violations_are_denied() {
        let store = SpaceSqlStore::in_memory().unwrap();
        let alice = client(&store, "alice");

        let cases = vec![
            create_args(vec![member("bob", SpaceRole::Admin)]),
            create_args(vec![member("alice", SpaceRole::User)]),
            create_args(vec![]),
            create_args(vec![
                member("alice", SpaceRole::Admin),
                member("bob", SpaceRole::User),
            ]),
        ];

        for args in cases {
            let err = alice.create_space(args).await.unwrap_err();
            assert_eq!(err.kind, DataErrorKind::PolicyDenied);
            assert_eq!(err.code(), "P2004");
        }

        let mut no_members = create_args(vec![]);
        no_members.data.members = None;
        assert_eq!(
            alice.create_space(no_members).await.unwrap_err().kind,
            DataErrorKind::PolicyDenied
        );

        assert!(!store.slug_exists("acme1").unwrap());
    }

    #[tokio::test]
    async fn test_create_validates_server_side() {
        let store = SpaceSqlStore::in_memory().unwrap();
        let alice = client(&store, "alice");

        let err = alice
            .create_space(SpaceCreateArgs::for_creator("abc", "acme1", UserId::new("alice")))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "P2007");
        assert_eq!(err.target.as_deref(), Some("name"));
    }

    #[tokio::test]
    async fn test_reads_only_see_own_spaces() {
        let store = SpaceSqlStore::in_memory().unwrap();
        let alice = client(&store, "alice");
        let bob = client(&store, "bob");

        alice
            .create_space(SpaceCreateArgs::for_creator("Acme Corp", "acme1", UserId::new("alice")))
            .await
            .unwrap();

        let found = alice
            .find_unique_space(SpaceFindUniqueArgs {
                filter: SpaceWhereUnique::slug("acme1"),
            })
            .await
            .unwrap();
        assert_eq!(found.slug, "acme1");

        let err = bob
            .find_unique_space(SpaceFindUniqueArgs {
                filter: SpaceWhereUnique::slug("acme1"),
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);

        assert_eq!(bob.count_spaces(SpaceCountArgs::default()).await.unwrap(), 0);
        assert!(bob
            .find_first_space(SpaceFindManyArgs::default())
            .await
            .unwrap()
            .is_none());
        assert!(bob
            .find_members(SpaceUserFindManyArgs::default())
            .await
            .unwrap()
            .is_empty());

        assert_eq!(alice.count_spaces(SpaceCountArgs::default()).await.unwrap(), 1);
        assert_eq!(
            alice.count_members(SpaceUserCountArgs::default()).await.unwrap(),
            1
        );
    }
}
