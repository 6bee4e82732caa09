//! GraphQL schema over a [`Store`].
//!
//! Every resolver is a pass-through to exactly one store call. The one
//! multi-step path is `Post.author`: posts from `allPosts` already carry the
//! author's name, every other path costs one `get_user` per post. That
//! per-post lookup is deliberate and is not batched.

use std::sync::Arc;

use async_graphql::extensions::Tracing;
use async_graphql::{
    Context, EmptySubscription, ErrorExtensions, ID, InputObject, Object, Result, Schema,
    SimpleObject,
};

use blog_types::{CreatePostInput, Post, Store, StoreError, User};

pub type SharedStore = Arc<dyn Store>;

pub type BlogSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(store: SharedStore) -> BlogSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(store)
        .extension(Tracing)
        .finish()
}

fn store<'a>(ctx: &Context<'a>) -> Result<&'a SharedStore> {
    ctx.data::<SharedStore>()
}

/// Surfaces a store failure as a field error: same message, plus a stable
/// `code` extension.
fn field_error(err: StoreError) -> async_graphql::Error {
    let code = err.code();
    async_graphql::Error::new(err.to_string())
        .extend_with(|_, ext| ext.set("code", code.to_string()))
}

#[derive(InputObject)]
pub struct GetUserInput {
    pub id: ID,
}

#[derive(SimpleObject)]
pub struct GetUserPayload {
    pub user: UserNode,
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Same lookup as `user`, in the input/payload shape the web client uses.
    async fn get_user(
        &self,
        ctx: &Context<'_>,
        input: GetUserInput,
    ) -> Result<GetUserPayload> {
        let user = store(ctx)?.get_user(&input.id).await.map_err(field_error)?;
        Ok(GetUserPayload { user: user.into() })
    }

    async fn user(&self, ctx: &Context<'_>, id: ID) -> Result<UserNode> {
        let user = store(ctx)?.get_user(&id).await.map_err(field_error)?;
        Ok(user.into())
    }

    async fn post(&self, ctx: &Context<'_>, id: ID) -> Result<PostNode> {
        let post = store(ctx)?.get_post(&id).await.map_err(field_error)?;
        Ok(PostNode(post))
    }

    async fn posts(&self, ctx: &Context<'_>, user_id: ID) -> Result<Vec<PostNode>> {
        let posts = store(ctx)?.get_posts(&user_id).await.map_err(field_error)?;
        Ok(posts.into_iter().map(PostNode).collect())
    }

    /// Newest first.
    async fn all_posts(&self, ctx: &Context<'_>) -> Result<Vec<PostNode>> {
        let posts = store(ctx)?.all_posts().await.map_err(field_error)?;
        Ok(posts.into_iter().map(PostNode).collect())
    }
}

#[derive(InputObject)]
#[graphql(name = "CreatePostInput")]
pub struct NewPost {
    pub title: String,
    /// Nullable in the schema; a missing body is stored as empty.
    pub content: Option<String>,
    pub user_id: ID,
}

impl From<NewPost> for CreatePostInput {
    fn from(input: NewPost) -> Self {
        CreatePostInput {
            title: input.title,
            content: input.content.unwrap_or_default(),
            user_id: input.user_id.0,
        }
    }
}

#[derive(SimpleObject)]
pub struct CreatePostPayload {
    pub post: PostNode,
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_post(
        &self,
        ctx: &Context<'_>,
        input: NewPost,
    ) -> Result<CreatePostPayload> {
        let post = store(ctx)?
            .create_post(input.into())
            .await
            .map_err(field_error)?;
        Ok(CreatePostPayload {
            post: PostNode(post),
        })
    }

    /// True once the delete has run, even if no post had that id.
    async fn delete_post(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        store(ctx)?.delete_post(&id).await.map_err(field_error)
    }
}

pub struct PostNode(pub Post);

#[Object(name = "Post")]
impl PostNode {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn content(&self) -> &str {
        &self.0.content
    }

    async fn published(&self) -> bool {
        self.0.published
    }

    async fn author(&self, ctx: &Context<'_>) -> Result<UserNode> {
        let author = &self.0.author;
        if let Some(name) = &author.name {
            return Ok(UserNode {
                id: author.id.clone(),
                name: name.clone(),
                email: None,
            });
        }
        let user = store(ctx)?.get_user(&author.id).await.map_err(field_error)?;
        Ok(user.into())
    }
}

/// A user as seen through the graph. `email` is `None` when the node was
/// built from a joined author name; it is then fetched only if selected.
pub struct UserNode {
    id: String,
    name: String,
    email: Option<String>,
}

impl From<User> for UserNode {
    fn from(user: User) -> Self {
        UserNode {
            id: user.id,
            name: user.name,
            email: Some(user.email),
        }
    }
}

#[Object(name = "User")]
impl UserNode {
    async fn id(&self) -> ID {
        ID(self.id.clone())
    }

    async fn name(&self) -> &str {
        &self.name
    }

    async fn email(&self, ctx: &Context<'_>) -> Result<String> {
        if let Some(email) = &self.email {
            return Ok(email.clone());
        }
        let user = store(ctx)?.get_user(&self.id).await.map_err(field_error)?;
        Ok(user.email)
    }

    async fn posts(&self, ctx: &Context<'_>) -> Result<Vec<PostNode>> {
        let posts = store(ctx)?.get_posts(&self.id).await.map_err(field_error)?;
        Ok(posts.into_iter().map(PostNode).collect())
    }
}
