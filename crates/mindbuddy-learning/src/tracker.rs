//! The learning progress tracker

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use mindbuddy_core::{Catalog, LearningError, LessonKind, ModuleSpec, QuizQuestion};

use crate::quiz::{QuizAttempt, quiz_passes};

/// What `advance` produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonOutcome {
    /// Quiz moved on to the question at `index`
    NextQuestion { index: usize, total: usize },
    /// Non-quiz lesson finished; `xp` is 0 when reviewing an
    /// already-completed lesson (no double reward)
    Completed { lesson_id: String, xp: u32 },
    /// Quiz submitted and passed; lesson marked completed
    QuizPassed {
        lesson_id: String,
        xp: u32,
        correct: usize,
        total: usize,
    },
    /// Quiz submitted below the threshold; attempt discarded, lesson
    /// state untouched, retry allowed
    QuizFailed { correct: usize, total: usize },
}

/// Derived module progress — always recomputed from lesson state, never
/// stored, so it cannot drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleProgress {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

struct ActiveLesson {
    lesson_id: String,
    /// Present only for quiz lessons
    attempt: Option<QuizAttempt>,
}

/// Tracks lock/completion state per lesson and the single in-progress
/// lesson, if any.
pub struct LearningTracker {
    modules: Vec<ModuleSpec>,
    quizzes: BTreeMap<String, Vec<QuizQuestion>>,
    active: Option<ActiveLesson>,
}

impl LearningTracker {
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            modules: catalog.modules.clone(),
            quizzes: catalog.quizzes.clone(),
            active: None,
        }
    }

    /// Open a lesson. Locked lessons are rejected; a quiz lesson gets a
    /// fresh attempt. Any previously in-progress lesson is abandoned
    /// with no side effects.
    pub fn start_lesson(&mut self, lesson_id: &str) -> Result<(), LearningError> {
        let lesson = self
            .lesson(lesson_id)
            .ok_or_else(|| LearningError::UnknownLesson(lesson_id.to_string()))?;

        if lesson.locked {
            return Err(LearningError::Locked);
        }

        let attempt = (lesson.kind == LessonKind::Quiz).then(QuizAttempt::new);
        debug!(lesson_id, quiz = attempt.is_some(), "lesson started");
        self.active = Some(ActiveLesson {
            lesson_id: lesson_id.to_string(),
            attempt,
        });
        Ok(())
    }

    /// Record an answer in the current quiz attempt. Correctness is not
    /// checked here; scoring happens at submission.
    pub fn answer(&mut self, question_id: &str, option_index: usize) -> Result<(), LearningError> {
        let active = self.active.as_mut().ok_or(LearningError::NoActiveLesson)?;
        let attempt = active.attempt.as_mut().ok_or(LearningError::NotAQuiz)?;
        attempt.answer(question_id, option_index);
        Ok(())
    }

    /// Advance the in-progress lesson.
    ///
    /// Non-quiz lessons complete immediately. Quizzes step through their
    /// questions and score on the last one: passing marks the lesson
    /// completed, failing discards the attempt and leaves everything as
    /// it was.
    pub fn advance(&mut self) -> Result<LessonOutcome, LearningError> {
        let active = self.active.as_mut().ok_or(LearningError::NoActiveLesson)?;
        let lesson_id = active.lesson_id.clone();

        let Some(attempt) = active.attempt.as_mut() else {
            self.active = None;
            let xp = self.mark_completed(&lesson_id);
            info!(lesson_id, xp, "lesson completed");
            return Ok(LessonOutcome::Completed { lesson_id, xp });
        };

        let questions = self.quizzes.get(&lesson_id).cloned().unwrap_or_default();
        let total = questions.len();

        if attempt.current_question() + 1 < total {
            let index = attempt.advance_question();
            return Ok(LessonOutcome::NextQuestion { index, total });
        }

        let correct = attempt.score(&questions);
        self.active = None;

        if quiz_passes(correct, total) {
            let xp = self.mark_completed(&lesson_id);
            info!(lesson_id, correct, total, xp, "quiz passed");
            Ok(LessonOutcome::QuizPassed {
                lesson_id,
                xp,
                correct,
                total,
            })
        } else {
            info!(lesson_id, correct, total, "quiz failed, retry allowed");
            Ok(LessonOutcome::QuizFailed { correct, total })
        }
    }

    /// Drop the in-progress lesson and any quiz attempt. No side
    /// effects; safe to call with nothing active.
    pub fn abandon(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(lesson_id = active.lesson_id, "lesson abandoned");
        }
    }

    /// Release a lesson's lock gate. The unlock policy lives outside the
    /// core; this is its entry point.
    pub fn unlock(&mut self, lesson_id: &str) -> Result<(), LearningError> {
        let lesson = self
            .lesson_mut(lesson_id)
            .ok_or_else(|| LearningError::UnknownLesson(lesson_id.to_string()))?;
        lesson.locked = false;
        Ok(())
    }

    /// Derived progress for one module
    pub fn module_progress(&self, module_id: &str) -> Option<ModuleProgress> {
        let module = self.modules.iter().find(|m| m.id == module_id)?;
        let total = module.lessons.len();
        let completed = module.lessons.iter().filter(|l| l.completed).count();
        let percent = if total == 0 {
            0
        } else {
            (completed * 100 / total) as u8
        };
        Some(ModuleProgress {
            completed,
            total,
            percent,
        })
    }

    pub fn modules(&self) -> &[ModuleSpec] {
        &self.modules
    }

    pub fn active_lesson_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.lesson_id.as_str())
    }

    pub fn current_question(&self) -> Option<usize> {
        self.active
            .as_ref()
            .and_then(|a| a.attempt.as_ref())
            .map(|attempt| attempt.current_question())
    }

    pub fn is_completed(&self, lesson_id: &str) -> bool {
        self.lesson(lesson_id).is_some_and(|l| l.completed)
    }

    pub fn is_locked(&self, lesson_id: &str) -> bool {
        self.lesson(lesson_id).is_some_and(|l| l.locked)
    }

    /// Set the completed flag and return the reward, or 0 when the
    /// lesson was already completed.
    fn mark_completed(&mut self, lesson_id: &str) -> u32 {
        match self.lesson_mut(lesson_id) {
            Some(lesson) if !lesson.completed => {
                lesson.completed = true;
                lesson.reward_xp
            }
            _ => 0,
        }
    }

    fn lesson(&self, lesson_id: &str) -> Option<&mindbuddy_core::LessonSpec> {
        self.modules
            .iter()
            .flat_map(|m| m.lessons.iter())
            .find(|l| l.id == lesson_id)
    }

    fn lesson_mut(&mut self, lesson_id: &str) -> Option<&mut mindbuddy_core::LessonSpec> {
        self.modules
            .iter_mut()
            .flat_map(|m| m.lessons.iter_mut())
            .find(|l| l.id == lesson_id)
    }
}
