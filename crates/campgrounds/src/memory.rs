use async_trait::async_trait;
use chrono::Utc;
use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};
use uuid::Uuid;

use crate::store::{CampgroundStore, in_list_order};
use crate::types::*;

#[derive(Default)]
struct Listings {
    campgrounds: Vec<Campground>,
    comments: HashMap<Uuid, Comment>,
}

/// Campground store kept in process memory. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryCampgroundStore {
    listings: RwLock<Listings>,
}

impl MemoryCampgroundStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of comment records, including any no longer listed on a campground.
    pub fn comment_count(&self) -> usize {
        self.listings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .comments
            .len()
    }
}

#[async_trait]
impl CampgroundStore for MemoryCampgroundStore {
    async fn list_campgrounds(&self) -> Result<Vec<Campground>, StoreError> {
        let listings = self.listings.read().unwrap_or_else(PoisonError::into_inner);
        Ok(listings.campgrounds.clone())
    }

    async fn find_campground(&self, id: &Uuid) -> Result<Option<Campground>, StoreError> {
        let listings = self.listings.read().unwrap_or_else(PoisonError::into_inner);
        Ok(listings.campgrounds.iter().find(|c| c.id == *id).cloned())
    }

    async fn insert_campground(&self, campground: NewCampground) -> Result<Campground, StoreError> {
        let campground = Campground {
            id: Uuid::new_v4(),
            name: campground.name.trim().to_string(),
            price: campground.price.trim().to_string(),
            description: campground.description,
            image: campground.image,
            author: campground.author,
            comment_ids: Vec::new(),
            created_at: Utc::now(),
        };

        let mut listings = self.listings.write().unwrap_or_else(PoisonError::into_inner);
        listings.campgrounds.push(campground.clone());
        Ok(campground)
    }

    async fn update_campground(
        &self,
        id: &Uuid,
        changes: CampgroundChanges,
    ) -> Result<Campground, StoreError> {
        let mut listings = self.listings.write().unwrap_or_else(PoisonError::into_inner);
        let campground = listings
            .campgrounds
            .iter_mut()
            .find(|c| c.id == *id)
            .ok_or(StoreError::CampgroundNotFound)?;

        campground.name = changes.name.trim().to_string();
        campground.price = changes.price.trim().to_string();
        campground.description = changes.description;
        if let Some(image) = changes.image {
            campground.image = image;
        }
        Ok(campground.clone())
    }

    async fn delete_campground(&self, id: &Uuid) -> Result<Campground, StoreError> {
        let mut listings = self.listings.write().unwrap_or_else(PoisonError::into_inner);
        let index = listings
            .campgrounds
            .iter()
            .position(|c| c.id == *id)
            .ok_or(StoreError::CampgroundNotFound)?;

        let campground = listings.campgrounds.remove(index);
        for comment_id in &campground.comment_ids {
            listings.comments.remove(comment_id);
        }
        Ok(campground)
    }

    async fn comments_for(&self, campground: &Campground) -> Result<Vec<Comment>, StoreError> {
        let listings = self.listings.read().unwrap_or_else(PoisonError::into_inner);
        let comments = campground
            .comment_ids
            .iter()
            .filter_map(|id| listings.comments.get(id).cloned())
            .collect();
        Ok(in_list_order(&campground.comment_ids, comments))
    }

    async fn find_comment(&self, id: &Uuid) -> Result<Option<Comment>, StoreError> {
        let listings = self.listings.read().unwrap_or_else(PoisonError::into_inner);
        Ok(listings.comments.get(id).cloned())
    }

    async fn add_comment(
        &self,
        campground_id: &Uuid,
        comment: NewComment,
    ) -> Result<Comment, StoreError> {
        let mut listings = self.listings.write().unwrap_or_else(PoisonError::into_inner);
        let comment = Comment {
            id: Uuid::new_v4(),
            text: comment.text,
            author: comment.author,
            created_at: Utc::now(),
        };

        let campground = listings
            .campgrounds
            .iter_mut()
            .find(|c| c.id == *campground_id)
            .ok_or(StoreError::CampgroundNotFound)?;
        campground.comment_ids.push(comment.id);
        listings.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update_comment(&self, id: &Uuid, text: String) -> Result<Comment, StoreError> {
        let mut listings = self.listings.write().unwrap_or_else(PoisonError::into_inner);
        let comment = listings
            .comments
            .get_mut(id)
            .ok_or(StoreError::CommentNotFound)?;
        comment.text = text;
        Ok(comment.clone())
    }

    async fn delete_comment(&self, campground_id: &Uuid, id: &Uuid) -> Result<(), StoreError> {
        let mut listings = self.listings.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(campground) = listings
            .campgrounds
            .iter_mut()
            .find(|c| c.id == *campground_id)
        {
            campground.comment_ids.retain(|c| c != id);
        }
        listings
            .comments
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::CommentNotFound)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut listings = self.listings.write().unwrap_or_else(PoisonError::into_inner);
        listings.campgrounds.clear();
        listings.comments.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(name: &str) -> Author {
        Author {
            id: Uuid::new_v4(),
            username: name.to_string(),
        }
    }

    fn new_campground(name: &str, author: &Author) -> NewCampground {
        NewCampground {
            name: name.to_string(),
            price: " 9.00 ".to_string(),
            description: "quiet".to_string(),
            image: CampgroundImage {
                url: "https://example.com/a.jpg".to_string(),
                host_id: Some("yelpcamp/a".to_string()),
            },
            author: author.clone(),
        }
    }

    fn new_comment(text: &str, author: &Author) -> NewComment {
        NewComment {
            text: text.to_string(),
            author: author.clone(),
        }
    }

    #[tokio::test]
    async fn campgrounds_are_listed_in_insertion_order() {
        let store = MemoryCampgroundStore::new();
        let homer = author("Homer");
        store.insert_campground(new_campground("First", &homer)).await.unwrap();
        store.insert_campground(new_campground("Second", &homer)).await.unwrap();

        let names: Vec<String> = store
            .list_campgrounds()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[tokio::test]
    async fn insert_trims_and_starts_without_comments() {
        let store = MemoryCampgroundStore::new();
        let campground = store
            .insert_campground(new_campground("  Lake  ", &author("Homer")))
            .await
            .unwrap();

        assert_eq!(campground.name, "Lake");
        assert_eq!(campground.price, "9.00");
        assert!(campground.comment_ids.is_empty());
    }

    #[tokio::test]
    async fn update_keeps_the_image_unless_replaced() {
        let store = MemoryCampgroundStore::new();
        let campground = store
            .insert_campground(new_campground("Lake", &author("Homer")))
            .await
            .unwrap();

        let updated = store
            .update_campground(
                &campground.id,
                CampgroundChanges {
                    name: "Lake Shore".to_string(),
                    price: "11".to_string(),
                    description: "still quiet".to_string(),
                    image: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Lake Shore");
        assert_eq!(updated.image, campground.image);
    }

    #[tokio::test]
    async fn comments_are_appended_in_order() {
        let store = MemoryCampgroundStore::new();
        let homer = author("Homer");
        let campground = store
            .insert_campground(new_campground("Lake", &homer))
            .await
            .unwrap();

        store
            .add_comment(&campground.id, new_comment("first", &homer))
            .await
            .unwrap();
        store
            .add_comment(&campground.id, new_comment("second", &homer))
            .await
            .unwrap();

        let campground = store.find_campground(&campground.id).await.unwrap().unwrap();
        let texts: Vec<String> = store
            .comments_for(&campground)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.text)
            .collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn commenting_on_a_missing_campground_fails() {
        let store = MemoryCampgroundStore::new();
        let result = store
            .add_comment(&Uuid::new_v4(), new_comment("hi", &author("Homer")))
            .await;

        assert!(matches!(result, Err(StoreError::CampgroundNotFound)));
        assert_eq!(store.comment_count(), 0);
    }

    #[tokio::test]
    async fn deleting_a_campground_removes_its_comments() {
        let store = MemoryCampgroundStore::new();
        let homer = author("Homer");
        let doomed = store
            .insert_campground(new_campground("Doomed", &homer))
            .await
            .unwrap();
        let kept = store
            .insert_campground(new_campground("Kept", &homer))
            .await
            .unwrap();
        store
            .add_comment(&doomed.id, new_comment("bye", &homer))
            .await
            .unwrap();
        store
            .add_comment(&kept.id, new_comment("stay", &homer))
            .await
            .unwrap();

        let deleted = store.delete_campground(&doomed.id).await.unwrap();

        assert_eq!(deleted.id, doomed.id);
        assert!(store.find_campground(&doomed.id).await.unwrap().is_none());
        assert_eq!(store.comment_count(), 1);
    }

    #[tokio::test]
    async fn deleting_a_comment_unlists_it() {
        let store = MemoryCampgroundStore::new();
        let homer = author("Homer");
        let campground = store
            .insert_campground(new_campground("Lake", &homer))
            .await
            .unwrap();
        let comment = store
            .add_comment(&campground.id, new_comment("oops", &homer))
            .await
            .unwrap();

        store.delete_comment(&campground.id, &comment.id).await.unwrap();

        let campground = store.find_campground(&campground.id).await.unwrap().unwrap();
        assert!(campground.comment_ids.is_empty());
        assert!(store.find_comment(&comment.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete_comment(&campground.id, &comment.id).await,
            Err(StoreError::CommentNotFound)
        ));
    }
}
