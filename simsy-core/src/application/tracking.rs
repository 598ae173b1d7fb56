//! Per-user state on a show: reached position, episode moves and list
//! membership.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use simsy_model::{SeasonEpisode, Show, ShowID, UserList};
use tracing::{debug, info};
use uuid::Uuid;

use super::unit_of_work::AppUnitOfWork;
use crate::error::{CoreError, Result};
use crate::progress::{
    EpisodeChange, Navigation, ProgressError, ShowProgress, change_episode,
};

/// What the player needs to resume a show for the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowUserState {
    pub season_reached: Option<u32>,
    pub episode_reached: Option<u32>,
    pub time_reached: u64,
    pub time_autosave: bool,
    pub autoplay: bool,
    pub view_captions: bool,
    pub in_favorites: bool,
    pub in_watchlist: bool,
}

/// Body of a progress update. Omitted fields keep what is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressUpdate {
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub time_reached: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdated {
    pub message: String,
    pub new_time_reached: u64,
}

/// Optional starting position for an episode move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeFrom {
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

impl EpisodeFrom {
    fn resolve(self, stored: Option<SeasonEpisode>) -> Option<SeasonEpisode> {
        match (self.season, self.episode) {
            (None, None) => None,
            (season, episode) => {
                let base = stored.unwrap_or(SeasonEpisode::FIRST);
                Some(SeasonEpisode::new(
                    season.unwrap_or(base.season),
                    episode.unwrap_or(base.episode),
                ))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListToggle {
    pub list: UserList,
    pub in_list: bool,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct TrackingService {
    uow: AppUnitOfWork,
}

impl TrackingService {
    pub fn new(uow: AppUnitOfWork) -> Self {
        Self { uow }
    }

    async fn require_show(&self, id: ShowID) -> Result<Show> {
        self.uow
            .shows
            .get(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Show not found!"))
    }

    /// Reached position, playback preferences and list membership. Reading
    /// never writes a default document.
    pub async fn user_state(&self, user: Uuid, show_id: ShowID) -> Result<ShowUserState> {
        let show = self.require_show(show_id).await?;
        let stored = self.uow.progress.get(user, show_id).await?;
        let reached = ShowProgress::view_stored(stored.as_ref(), show.kind);
        let prefs = self.uow.users.get_preferences(user).await?;

        Ok(ShowUserState {
            season_reached: reached.season_reached,
            episode_reached: reached.episode_reached,
            time_reached: reached.time_reached,
            time_autosave: prefs.time_autosave,
            autoplay: prefs.autoplay,
            view_captions: prefs.view_captions,
            in_favorites: self
                .uow
                .user_lists
                .contains(user, show_id, UserList::Favorites)
                .await?,
            in_watchlist: self
                .uow
                .user_lists
                .contains(user, show_id, UserList::Watchlist)
                .await?,
        })
    }

    pub async fn update_progress(
        &self,
        user: Uuid,
        show_id: ShowID,
        update: ProgressUpdate,
    ) -> Result<ProgressUpdated> {
        let show = self.require_show(show_id).await?;
        let mut recorded = (SeasonEpisode::FIRST, 0);
        self.uow
            .progress
            .modify(user, show_id, Utc::now(), &mut |stored| {
                let mut progress = stored
                    .filter(|stored| stored.matches(show.kind))
                    .unwrap_or_else(|| ShowProgress::initial(show.kind));

                let base = progress.position().unwrap_or(SeasonEpisode::FIRST);
                let position = SeasonEpisode::new(
                    update.season.unwrap_or(base.season),
                    update.episode.unwrap_or(base.episode),
                );
                if show.kind.is_episodic() {
                    let out_of_range = position.season == 0
                        || position.episode == 0
                        || (!show.episodes.is_empty() && !show.episodes.contains(position));
                    if out_of_range {
                        return Err(ProgressError::OutOfRange(position).into());
                    }
                }

                let time = progress.record(show.kind, position, update.time_reached);
                recorded = (position, time);
                Ok(progress)
            })
            .await?;
        let (position, time) = recorded;
        debug!(user_id = %user, show_id = %show_id, %position, time, "recorded progress");

        Ok(ProgressUpdated {
            message: format!(
                "Updated time reached for the {} '{}' Season {} Episode {} to {}",
                show.kind.title(),
                show.name,
                position.season,
                position.episode,
                time
            ),
            new_time_reached: time,
        })
    }

    /// Move the caller to another episode, starting from `from` when given
    /// and from the stored position otherwise.
    pub async fn change_episode(
        &self,
        user: Uuid,
        show_id: ShowID,
        nav: Navigation,
        from: EpisodeFrom,
    ) -> Result<EpisodeChange> {
        let show = self.require_show(show_id).await?;
        let mut outcome = None;
        self.uow
            .progress
            .modify(user, show_id, Utc::now(), &mut |stored| {
                let stored_position = stored
                    .as_ref()
                    .filter(|progress| progress.matches(show.kind))
                    .and_then(ShowProgress::position);
                let (progress, change) = change_episode(
                    show.kind,
                    &show.episodes,
                    stored,
                    from.resolve(stored_position),
                    nav,
                )?;
                outcome = Some(change);
                Ok(progress)
            })
            .await?;
        let change =
            outcome.ok_or_else(|| CoreError::Internal("episode change not applied".into()))?;
        debug!(
            user_id = %user,
            show_id = %show_id,
            nav = %nav,
            season = change.new_season,
            episode = change.new_episode,
            "changed episode"
        );
        Ok(change)
    }

    pub async fn toggle(&self, user: Uuid, show_id: ShowID, list: UserList) -> Result<ListToggle> {
        self.require_show(show_id).await?;
        let in_list = self.uow.user_lists.toggle(user, show_id, list).await?;
        let message = if in_list {
            format!("Show added to {list} successfully!")
        } else {
            format!("Show removed from {list} successfully!")
        };
        info!(user_id = %user, show_id = %show_id, list = %list, in_list, "toggled list");
        Ok(ListToggle {
            list,
            in_list,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn episode_from_fills_missing_half_from_stored() {
        let stored = Some(SeasonEpisode::new(3, 4));
        assert_eq!(EpisodeFrom::default().resolve(stored), None);
        assert_eq!(
            EpisodeFrom {
                season: None,
                episode: Some(2)
            }
            .resolve(stored),
            Some(SeasonEpisode::new(3, 2))
        );
        assert_eq!(
            EpisodeFrom {
                season: Some(2),
                episode: None
            }
            .resolve(None),
            Some(SeasonEpisode::new(2, 1))
        );
    }
}
