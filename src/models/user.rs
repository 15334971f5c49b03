use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Trip;

/// A traveller profile and its denormalized engagement caches
///
/// `liked_trips` and `saved_trips` mirror the trip-side `likes` / `saved_by`
/// edges. They can drift from those edges; see `Store::resync_engagement_cache`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub travel_style: Option<String>,
    pub location: Option<String>,
    pub followings: Vec<Uuid>,
    pub liked_trips: Vec<Uuid>,
    pub saved_trips: Vec<Uuid>,
    /// Owned trips
    pub trips: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to provision a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub travel_style: Option<String>,
    pub location: Option<String>,
}

impl NewUser {
    /// A throwaway test user with a generated id and a matching placeholder email
    pub fn test_user(travel_style: Option<String>, location: Option<String>) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            email: format!("test_{}@example.com", id),
            travel_style,
            location,
        }
    }
}

/// Projection of a user used when building a social graph
#[derive(Debug, Clone, Serialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserStyle {
    pub id: Uuid,
    pub travel_style: Option<String>,
}

/// A user with its references resolved against the store
///
/// Dangling references (ids whose target no longer exists) are dropped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithRelations {
    pub user: User,
    pub trips: Vec<Trip>,
    pub saved_trips: Vec<Trip>,
    pub followings: Vec<UserStyle>,
}

/// A user document with owned trips and followings expanded in place
///
/// Same keys as `User`; `liked_trips` and `saved_trips` stay as ids.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedUser {
    pub id: Uuid,
    pub email: String,
    pub travel_style: Option<String>,
    pub location: Option<String>,
    pub followings: Vec<UserStyle>,
    pub liked_trips: Vec<Uuid>,
    pub saved_trips: Vec<Uuid>,
    pub trips: Vec<Trip>,
    pub created_at: DateTime<Utc>,
}

impl From<UserWithRelations> for PopulatedUser {
    fn from(resolved: UserWithRelations) -> Self {
        let UserWithRelations {
            user,
            trips,
            followings,
            ..
        } = resolved;

        Self {
            id: user.id,
            email: user.email,
            travel_style: user.travel_style,
            location: user.location,
            followings,
            liked_trips: user.liked_trips,
            saved_trips: user.saved_trips,
            trips,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_test_user_email_embeds_id() {
        let user = NewUser::test_user(Some("budget".to_string()), None);
        assert_eq!(user.email, format!("test_{}@example.com", user.id));
        assert_eq!(user.travel_style.as_deref(), Some("budget"));
    }

    #[test]
    fn test_populated_user_is_flat() {
        let user_id = Uuid::new_v4();
        let friend = UserStyle {
            id: Uuid::new_v4(),
            travel_style: Some("party".to_string()),
        };
        let liked = Uuid::new_v4();
        let resolved = UserWithRelations {
            user: User {
                id: user_id,
                email: "a@example.com".to_string(),
                travel_style: Some("solo".to_string()),
                location: None,
                followings: vec![friend.id],
                liked_trips: vec![liked],
                saved_trips: vec![],
                trips: vec![],
                created_at: Utc::now(),
            },
            trips: vec![],
            saved_trips: vec![],
            followings: vec![friend.clone()],
        };

        let json = serde_json::to_value(PopulatedUser::from(resolved)).unwrap();
        assert_eq!(json["email"], "a@example.com");
        assert_eq!(json["travelStyle"], "solo");
        assert_eq!(json["followings"][0]["travelStyle"], "party");
        assert_eq!(json["likedTrips"][0], liked.to_string());
        assert!(json.get("user").is_none());
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let user = User {
            id: Uuid::nil(),
            email: "a@example.com".to_string(),
            travel_style: Some("solo".to_string()),
            location: None,
            followings: vec![],
            liked_trips: vec![],
            saved_trips: vec![],
            trips: vec![],
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["travelStyle"], "solo");
        assert!(json["likedTrips"].as_array().unwrap().is_empty());
        assert!(json.get("travel_style").is_none());
    }
}
