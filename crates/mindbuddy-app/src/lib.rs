//! # MindBuddy App
//!
//! The composition root: one [`App`] value owns the session controller
//! and, while a session is live, the conversation synchronizer, the
//! economy engine, and the learning tracker.
//!
//! All mutation flows through `&mut self` on a single logical thread.
//! The message log's event stream is pulled, not pushed: callers drain
//! it with [`App::pump_chat`] at the point they want fresh state, so no
//! background task ever mutates shared state.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use mindbuddy_core::{
    AppError, CallSignaling, Catalog, ChatEvent, Credentials, Identity, IdentityProvider,
    MessageLog, RewardEvent, Role, Task,
};
use mindbuddy_economy::EconomyEngine;
use mindbuddy_learning::{LearningTracker, LessonOutcome, ModuleProgress};
use mindbuddy_messaging::{ChatMessage, ChatSync, MessageKey};
use mindbuddy_session::{Overlay, SessionController, Tab};

pub use mindbuddy_economy::PetMood;

/// Per-installation configuration for a session.
#[derive(Debug, Clone)]
pub struct Config {
    pub catalog: Catalog,
    pub pet_name: String,
    pub starting_xp: u32,
    pub starting_happiness: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: Catalog::default(),
            pet_name: "Buddy".to_string(),
            starting_xp: 320,
            starting_happiness: 78,
        }
    }
}

/// The application core.
///
/// The chat synchronizer, economy engine, and learning tracker exist
/// only while logged in; mentors get chat only. Every operation on them
/// is gated and returns [`AppError::LoggedOut`] outside a matching
/// session.
pub struct App {
    config: Config,
    session: SessionController,
    log: Arc<dyn MessageLog>,
    signaling: Option<Arc<dyn CallSignaling>>,
    chat: Option<ChatSync>,
    events: Option<broadcast::Receiver<ChatEvent>>,
    economy: Option<EconomyEngine>,
    learning: Option<LearningTracker>,
}

impl App {
    pub fn new(
        config: Config,
        provider: Arc<dyn IdentityProvider>,
        log: Arc<dyn MessageLog>,
    ) -> Self {
        Self {
            config,
            session: SessionController::new(provider),
            log,
            signaling: None,
            chat: None,
            events: None,
            economy: None,
            learning: None,
        }
    }

    /// Attach a call signaling backend. Without one, call controls still
    /// drive the overlay but send nothing.
    pub fn with_call_signaling(mut self, signaling: Arc<dyn CallSignaling>) -> Self {
        self.signaling = Some(signaling);
        self
    }

    // ---- session lifecycle ----

    /// Log in and build the per-session state for the confirmed role.
    pub async fn login(
        &mut self,
        requested: Role,
        credentials: &Credentials,
    ) -> Result<Identity, AppError> {
        let identity = self.session.login(requested, credentials).await?;

        // Subscribe before building the synchronizer so no event between
        // the two can be missed.
        self.events = Some(self.log.subscribe());
        self.chat = Some(ChatSync::new(identity.role, self.log.clone()));

        if identity.role == Role::Student {
            self.economy = Some(EconomyEngine::new(
                &self.config.catalog,
                &self.config.pet_name,
                self.config.starting_xp,
                self.config.starting_happiness,
            ));
            self.learning = Some(LearningTracker::new(&self.config.catalog));
        } else {
            self.economy = None;
            self.learning = None;
        }

        info!(role = %identity.role, "session ready");
        Ok(identity)
    }

    /// Log out: unsubscribes the event stream and drops all derived
    /// state. Idempotent.
    pub async fn logout(&mut self) {
        self.session.logout().await;
        self.chat = None;
        self.events = None;
        self.economy = None;
        self.learning = None;
    }

    // ---- navigation ----

    pub fn navigate(&mut self, target: Tab) -> Result<(), AppError> {
        self.session.navigate(target)
    }

    pub fn open_overlay(&mut self, kind: Overlay) -> Result<Option<Overlay>, AppError> {
        self.session.open_overlay(kind)
    }

    /// Close the current overlay. Closing a lesson overlay abandons any
    /// in-progress quiz attempt.
    pub fn close_overlay(&mut self) -> Result<Option<Overlay>, AppError> {
        let closed = self.session.close_overlay()?;
        if closed == Some(Overlay::Lesson)
            && let Some(learning) = self.learning.as_mut()
        {
            learning.abandon();
        }
        Ok(closed)
    }

    // ---- chat ----

    pub async fn send_message(&mut self, text: &str) -> Result<MessageKey, AppError> {
        let chat = self.chat.as_mut().ok_or(AppError::LoggedOut)?;
        Ok(chat.send(text).await?)
    }

    pub async fn retry_message(&mut self, key: MessageKey) -> Result<MessageKey, AppError> {
        let chat = self.chat.as_mut().ok_or(AppError::LoggedOut)?;
        Ok(chat.retry(key).await?)
    }

    /// Drain pending events from the log stream into the synchronizer.
    /// Returns how many events were applied.
    pub fn pump_chat(&mut self) -> Result<usize, AppError> {
        let chat = self.chat.as_mut().ok_or(AppError::LoggedOut)?;
        let events = self.events.as_mut().ok_or(AppError::LoggedOut)?;

        let mut applied = 0;
        loop {
            match events.try_recv() {
                Ok(event) => {
                    chat.apply(event);
                    applied += 1;
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "chat stream lagged, events lost");
                }
                Err(_) => break,
            }
        }
        Ok(applied)
    }

    /// The rendered conversation, time-ordered.
    pub fn messages(&self) -> Result<Vec<ChatMessage>, AppError> {
        let chat = self.chat.as_ref().ok_or(AppError::LoggedOut)?;
        Ok(chat.messages())
    }

    pub fn failed_messages(&self) -> Result<Vec<MessageKey>, AppError> {
        let chat = self.chat.as_ref().ok_or(AppError::LoggedOut)?;
        Ok(chat.failed_keys())
    }

    // ---- calls ----

    /// Accept an incoming call and open the call overlay.
    pub async fn accept_call(&mut self) -> Result<Option<Overlay>, AppError> {
        let replaced = self.session.open_overlay(Overlay::Call)?;
        if let Some(signaling) = &self.signaling {
            signaling.accept().await;
        }
        Ok(replaced)
    }

    /// Decline an incoming call; no overlay involved.
    pub async fn decline_call(&mut self) -> Result<(), AppError> {
        if !self.session.is_logged_in() {
            return Err(AppError::LoggedOut);
        }
        if let Some(signaling) = &self.signaling {
            signaling.decline().await;
        }
        Ok(())
    }

    /// Hang up and close the call overlay.
    pub async fn end_call(&mut self) -> Result<(), AppError> {
        if self.session.overlay() == Some(Overlay::Call) {
            self.session.close_overlay()?;
        }
        if let Some(signaling) = &self.signaling {
            signaling.end().await;
        }
        Ok(())
    }

    // ---- economy ----

    pub fn complete_task(&mut self, task_id: &str) -> Result<RewardEvent, AppError> {
        let economy = self.economy.as_mut().ok_or(AppError::LoggedOut)?;
        Ok(economy.complete_task(task_id)?)
    }

    pub fn purchase(&mut self, item_id: &str) -> Result<(), AppError> {
        let economy = self.economy.as_mut().ok_or(AppError::LoggedOut)?;
        Ok(economy.purchase(item_id)?)
    }

    /// Feed the pet, returning the new happiness.
    pub fn feed(&mut self, item_id: &str) -> Result<u8, AppError> {
        let economy = self.economy.as_mut().ok_or(AppError::LoggedOut)?;
        Ok(economy.feed(item_id)?)
    }

    // ---- learning ----

    /// Open a lesson and the lesson overlay. A quiz lesson gets a fresh
    /// attempt.
    pub fn start_lesson(&mut self, lesson_id: &str) -> Result<(), AppError> {
        let learning = self.learning.as_mut().ok_or(AppError::LoggedOut)?;
        learning.start_lesson(lesson_id)?;
        self.session.open_overlay(Overlay::Lesson)?;
        Ok(())
    }

    pub fn answer(&mut self, question_id: &str, option_index: usize) -> Result<(), AppError> {
        let learning = self.learning.as_mut().ok_or(AppError::LoggedOut)?;
        Ok(learning.answer(question_id, option_index)?)
    }

    /// Advance the in-progress lesson, routing any earned reward into
    /// the economy engine. A completed or passed lesson closes the
    /// lesson overlay; a failed quiz leaves it open for the retry.
    pub fn advance_lesson(&mut self) -> Result<LessonOutcome, AppError> {
        let learning = self.learning.as_mut().ok_or(AppError::LoggedOut)?;
        let outcome = learning.advance()?;

        match &outcome {
            LessonOutcome::Completed { lesson_id, xp } => {
                if *xp > 0
                    && let Some(economy) = self.economy.as_mut()
                {
                    economy.award_lesson_completion(lesson_id, *xp);
                }
                self.session.close_overlay()?;
            }
            LessonOutcome::QuizPassed {
                lesson_id,
                xp,
                correct,
                total,
            } => {
                if *xp > 0
                    && let Some(economy) = self.economy.as_mut()
                {
                    economy.award_quiz_pass(lesson_id, *xp, *correct, *total);
                }
                self.session.close_overlay()?;
            }
            LessonOutcome::QuizFailed { correct, total } => {
                debug!(correct, total, "quiz failed, overlay stays open");
            }
            LessonOutcome::NextQuestion { .. } => {}
        }

        Ok(outcome)
    }

    pub fn module_progress(&self, module_id: &str) -> Option<ModuleProgress> {
        self.learning.as_ref()?.module_progress(module_id)
    }

    // ---- read accessors ----

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.session.identity()
    }

    pub fn role(&self) -> Option<Role> {
        self.session.role()
    }

    pub fn tab(&self) -> Option<Tab> {
        self.session.tab()
    }

    pub fn overlay(&self) -> Option<Overlay> {
        self.session.overlay()
    }

    pub fn xp(&self) -> Option<u32> {
        self.economy.as_ref().map(|e| e.balance())
    }

    pub fn happiness(&self) -> Option<u8> {
        self.economy.as_ref().map(|e| e.happiness())
    }

    pub fn pet_mood(&self) -> Option<PetMood> {
        self.economy.as_ref().map(|e| e.pet_mood())
    }

    pub fn tasks(&self) -> Option<&[Task]> {
        self.economy.as_ref().map(|e| e.tasks())
    }

    pub fn inventory_count(&self, item_id: &str) -> u32 {
        self.economy
            .as_ref()
            .map(|e| e.inventory_count(item_id))
            .unwrap_or(0)
    }

    /// Direct read access to the economy engine, while logged in as a
    /// student.
    pub fn economy(&self) -> Option<&EconomyEngine> {
        self.economy.as_ref()
    }

    pub fn learning(&self) -> Option<&LearningTracker> {
        self.learning.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindbuddy_core::{MockCallSignaling, MockIdentityProvider, MockMessageLog};

    fn app_with_student() -> App {
        let provider = Arc::new(MockIdentityProvider::new().with_profile(
            "alex@example.com",
            "hunter2",
            Role::Student,
            "Alex",
        ));
        let log = Arc::new(MockMessageLog::new());
        App::new(Config::default(), provider, log)
    }

    async fn logged_in_student() -> App {
        let mut app = app_with_student();
        app.login(
            Role::Student,
            &Credentials::new("alex@example.com", "hunter2"),
        )
        .await
        .unwrap();
        app
    }

    #[tokio::test]
    async fn test_operations_gated_before_login() {
        let mut app = app_with_student();

        assert!(matches!(app.complete_task("t2"), Err(AppError::LoggedOut)));
        assert!(matches!(app.send_message("hi").await, Err(AppError::LoggedOut)));
        assert!(matches!(app.start_lesson("l3"), Err(AppError::LoggedOut)));
        assert!(matches!(app.messages(), Err(AppError::LoggedOut)));
        assert!(matches!(app.navigate(Tab::Learn), Err(AppError::LoggedOut)));
    }

    #[tokio::test]
    async fn test_mentor_session_has_chat_only() {
        let provider = Arc::new(MockIdentityProvider::new().with_profile(
            "sarah@example.com",
            "pw",
            Role::Mentor,
            "Sarah Chen",
        ));
        let log = Arc::new(MockMessageLog::new());
        let mut app = App::new(Config::default(), provider, log);

        app.login(Role::Mentor, &Credentials::new("sarah@example.com", "pw"))
            .await
            .unwrap();

        app.send_message("how was your week?").await.unwrap();
        assert_eq!(app.xp(), None);
        assert!(matches!(app.complete_task("t2"), Err(AppError::LoggedOut)));
        assert!(matches!(app.start_lesson("l3"), Err(AppError::LoggedOut)));
    }

    #[tokio::test]
    async fn test_logout_drops_derived_state() {
        let mut app = logged_in_student().await;
        app.complete_task("t2").unwrap();
        assert_eq!(app.xp(), Some(340));

        app.logout().await;
        assert!(!app.is_logged_in());
        assert_eq!(app.xp(), None);
        assert!(matches!(app.messages(), Err(AppError::LoggedOut)));

        // Idempotent
        app.logout().await;
        assert!(!app.is_logged_in());
    }

    #[tokio::test]
    async fn test_fresh_login_resets_per_session_state() {
        let mut app = logged_in_student().await;
        app.complete_task("t2").unwrap();
        app.logout().await;

        app.login(
            Role::Student,
            &Credentials::new("alex@example.com", "hunter2"),
        )
        .await
        .unwrap();
        assert_eq!(app.xp(), Some(320));
        assert!(app.complete_task("t2").is_ok());
    }

    #[tokio::test]
    async fn test_start_lesson_opens_overlay_and_close_abandons() {
        let mut app = logged_in_student().await;

        app.start_lesson("l3").unwrap();
        assert_eq!(app.overlay(), Some(Overlay::Lesson));
        app.answer("q1", 1).unwrap();

        let closed = app.close_overlay().unwrap();
        assert_eq!(closed, Some(Overlay::Lesson));
        assert_eq!(app.learning().unwrap().active_lesson_id(), None);
        assert!(!app.learning().unwrap().is_completed("l3"));
    }

    #[tokio::test]
    async fn test_completed_lesson_rewards_economy_and_closes_overlay() {
        let mut app = logged_in_student().await;
        let xp_before = app.xp().unwrap();
        let happiness_before = app.happiness().unwrap();

        app.start_lesson("l6").unwrap();
        let outcome = app.advance_lesson().unwrap();
        assert!(matches!(outcome, LessonOutcome::Completed { xp: 15, .. }));

        assert_eq!(app.xp(), Some(xp_before + 15));
        assert_eq!(app.happiness(), Some(happiness_before + 3));
        assert_eq!(app.overlay(), None);
    }

    #[tokio::test]
    async fn test_reviewing_completed_lesson_rewards_nothing() {
        let mut app = logged_in_student().await;
        let xp_before = app.xp().unwrap();

        app.start_lesson("l1").unwrap();
        let outcome = app.advance_lesson().unwrap();
        assert!(matches!(outcome, LessonOutcome::Completed { xp: 0, .. }));
        assert_eq!(app.xp(), Some(xp_before));
    }

    #[tokio::test]
    async fn test_call_controls_drive_overlay_and_signaling() {
        let signaling = Arc::new(MockCallSignaling::new());
        let provider = Arc::new(MockIdentityProvider::new().with_profile(
            "alex@example.com",
            "hunter2",
            Role::Student,
            "Alex",
        ));
        let log = Arc::new(MockMessageLog::new());
        let mut app = App::new(Config::default(), provider, log)
            .with_call_signaling(signaling.clone());

        app.login(
            Role::Student,
            &Credentials::new("alex@example.com", "hunter2"),
        )
        .await
        .unwrap();

        app.accept_call().await.unwrap();
        assert_eq!(app.overlay(), Some(Overlay::Call));
        assert_eq!(signaling.accepted(), 1);

        app.end_call().await.unwrap();
        assert_eq!(app.overlay(), None);
        assert_eq!(signaling.ended(), 1);

        app.decline_call().await.unwrap();
        assert_eq!(signaling.declined(), 1);
        assert_eq!(app.overlay(), None);
    }
}
