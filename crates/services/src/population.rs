//! Resolves author and reply references into populated views.
//!
//! Each step costs one query per level regardless of fan-out: authors are
//! fetched in bulk by id and replies in bulk by parent id.

use std::collections::HashMap;

use domains::{
    AuthorSummary, DomainError, Thread, ThreadCard, ThreadNode, ThreadRepository, UserRepository,
};
use uuid::Uuid;

pub(crate) struct Populator<'a> {
    pub users: &'a dyn UserRepository,
    pub threads: &'a dyn ThreadRepository,
}

impl Populator<'_> {
    /// Author projection for every distinct author of `threads`.
    pub async fn authors(
        &self,
        threads: &[Thread],
    ) -> Result<HashMap<String, AuthorSummary>, DomainError> {
        let mut ids: Vec<String> = threads.iter().map(|t| t.author_id.clone()).collect();
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let summaries = self.users.find_summaries(&ids).await?;
        Ok(summaries.into_iter().map(|s| (s.id.clone(), s)).collect())
    }

    /// Direct replies to `threads`, grouped by parent id.
    pub async fn children_of(
        &self,
        threads: &[Thread],
    ) -> Result<HashMap<Uuid, Vec<Thread>>, DomainError> {
        let ids: Vec<Uuid> = threads.iter().map(|t| t.id).collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut grouped: HashMap<Uuid, Vec<Thread>> = HashMap::new();
        for child in self.threads.find_children(&ids).await? {
            if let Some(parent) = child.parent_id {
                grouped.entry(parent).or_default().push(child);
            }
        }
        Ok(grouped)
    }

    /// Threads with their author attached and their replies as bare ids.
    pub async fn nodes(&self, threads: Vec<Thread>) -> Result<Vec<ThreadNode>, DomainError> {
        let authors = self.authors(&threads).await?;
        let mut children = self.children_of(&threads).await?;
        threads
            .into_iter()
            .map(|thread| {
                let author = lookup(&authors, &thread.author_id)?;
                let children = children
                    .remove(&thread.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|c| c.id)
                    .collect();
                Ok(ThreadNode { thread, author, children })
            })
            .collect()
    }

    /// Threads with their author and one level of populated replies.
    pub async fn cards(&self, threads: Vec<Thread>) -> Result<Vec<ThreadCard>, DomainError> {
        let authors = self.authors(&threads).await?;
        let children = self.children_of(&threads).await?;
        let mut nodes = group_nodes(self.nodes(children.into_values().flatten().collect()).await?);
        threads
            .into_iter()
            .map(|thread| {
                let author = lookup(&authors, &thread.author_id)?;
                let children = nodes.remove(&thread.id).unwrap_or_default();
                Ok(ThreadCard { thread, author, children })
            })
            .collect()
    }
}

/// Groups populated replies by parent, oldest first within each parent.
pub(crate) fn group_nodes(nodes: Vec<ThreadNode>) -> HashMap<Uuid, Vec<ThreadNode>> {
    let mut grouped: HashMap<Uuid, Vec<ThreadNode>> = HashMap::new();
    for node in nodes {
        if let Some(parent) = node.thread.parent_id {
            grouped.entry(parent).or_default().push(node);
        }
    }
    for replies in grouped.values_mut() {
        replies.sort_by(|a, b| {
            a.thread
                .created_at
                .cmp(&b.thread.created_at)
                .then_with(|| a.thread.id.cmp(&b.thread.id))
        });
    }
    grouped
}

fn lookup(
    authors: &HashMap<String, AuthorSummary>,
    id: &str,
) -> Result<AuthorSummary, DomainError> {
    authors
        .get(id)
        .cloned()
        .ok_or_else(|| DomainError::not_found("User", id))
}
