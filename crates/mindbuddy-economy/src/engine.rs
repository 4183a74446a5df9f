//! The economy engine

use std::collections::BTreeMap;

use tracing::{debug, info};

use mindbuddy_core::{Catalog, EconomyError, FoodItem, RewardEvent, Task};

use crate::ledger::XpLedger;
use crate::pet::{Pet, PetMood};

/// Happiness gained from completing a daily task
pub const TASK_HAPPINESS_BOOST: u8 = 2;

/// Happiness gained from completing a lesson or passing a quiz
pub const LESSON_HAPPINESS_BOOST: u8 = 3;

/// The single mutator of the XP ledger, the food inventory, and the
/// pet's happiness for one student session.
///
/// Each operation checks all of its guards before touching any state,
/// so effects are atomic from the caller's point of view: an observer
/// never sees XP credited without the matching happiness boost, or a
/// debit without the inventory increment.
pub struct EconomyEngine {
    ledger: XpLedger,
    pet: Pet,
    tasks: Vec<Task>,
    food: BTreeMap<String, FoodItem>,
    /// Owned count per food item id (multiset)
    inventory: BTreeMap<String, u32>,
}

impl EconomyEngine {
    /// Build an engine from the session catalog. Task completion flags
    /// start from the catalog's values.
    pub fn new(catalog: &Catalog, pet_name: &str, starting_xp: u32, starting_happiness: u8) -> Self {
        Self {
            ledger: XpLedger::new(starting_xp),
            pet: Pet::new(pet_name, starting_happiness),
            tasks: catalog.tasks.clone(),
            food: catalog
                .food
                .iter()
                .map(|f| (f.id.clone(), f.clone()))
                .collect(),
            inventory: BTreeMap::new(),
        }
    }

    /// Complete a daily task: sets the flag, credits the reward, boosts
    /// happiness. The reward is credited at most once per task.
    pub fn complete_task(&mut self, task_id: &str) -> Result<RewardEvent, EconomyError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| EconomyError::UnknownTask(task_id.to_string()))?;

        if task.completed {
            return Err(EconomyError::AlreadyCompleted);
        }

        task.completed = true;
        let xp = task.reward_xp;
        self.ledger.credit(xp);
        self.pet.boost(TASK_HAPPINESS_BOOST);
        info!(task_id, xp, "task completed");

        Ok(RewardEvent::TaskCompleted {
            task_id: task_id.to_string(),
            xp,
        })
    }

    /// Buy one unit of a food item: checked debit, then inventory
    /// increment — both or neither.
    pub fn purchase(&mut self, item_id: &str) -> Result<(), EconomyError> {
        let price = self
            .food
            .get(item_id)
            .map(|f| f.price)
            .ok_or_else(|| EconomyError::UnknownItem(item_id.to_string()))?;

        self.ledger.debit(price)?;
        *self.inventory.entry(item_id.to_string()).or_insert(0) += 1;
        debug!(item_id, price, balance = self.ledger.balance(), "purchase");
        Ok(())
    }

    /// Feed the pet one unit of an item. Rejected without consuming
    /// inventory when the pet is already satisfied. Returns the new
    /// happiness.
    pub fn feed(&mut self, item_id: &str) -> Result<u8, EconomyError> {
        let boost = self
            .food
            .get(item_id)
            .map(|f| f.happiness_boost)
            .ok_or_else(|| EconomyError::UnknownItem(item_id.to_string()))?;

        let count = self.inventory.get(item_id).copied().unwrap_or(0);
        if count == 0 {
            return Err(EconomyError::EmptyInventory);
        }
        if self.pet.is_satisfied() {
            return Err(EconomyError::PetSatisfied);
        }

        if count == 1 {
            self.inventory.remove(item_id);
        } else {
            self.inventory.insert(item_id.to_string(), count - 1);
        }
        let happiness = self.pet.boost(boost);
        debug!(item_id, happiness, "fed pet");
        Ok(happiness)
    }

    /// Reward a completed lesson (invoked by the learning tracker).
    pub fn award_lesson_completion(&mut self, lesson_id: &str, xp: u32) -> RewardEvent {
        self.ledger.credit(xp);
        self.pet.boost(LESSON_HAPPINESS_BOOST);
        info!(lesson_id, xp, "lesson completion rewarded");
        RewardEvent::LessonCompleted {
            lesson_id: lesson_id.to_string(),
            xp,
        }
    }

    /// Reward a passed quiz (invoked by the learning tracker).
    pub fn award_quiz_pass(
        &mut self,
        lesson_id: &str,
        xp: u32,
        correct: usize,
        total: usize,
    ) -> RewardEvent {
        self.ledger.credit(xp);
        self.pet.boost(LESSON_HAPPINESS_BOOST);
        info!(lesson_id, xp, correct, total, "quiz pass rewarded");
        RewardEvent::QuizPassed {
            lesson_id: lesson_id.to_string(),
            xp,
            correct,
            total,
        }
    }

    pub fn balance(&self) -> u32 {
        self.ledger.balance()
    }

    pub fn happiness(&self) -> u8 {
        self.pet.happiness()
    }

    pub fn pet_mood(&self) -> PetMood {
        self.pet.mood()
    }

    pub fn pet(&self) -> &Pet {
        &self.pet
    }

    pub fn inventory_count(&self, item_id: &str) -> u32 {
        self.inventory.get(item_id).copied().unwrap_or(0)
    }

    /// Owned counts per item id, items with zero units omitted
    pub fn inventory(&self) -> &BTreeMap<String, u32> {
        &self.inventory
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn tasks_completed(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(starting_xp: u32, starting_happiness: u8) -> EconomyEngine {
        EconomyEngine::new(&Catalog::default(), "Buddy", starting_xp, starting_happiness)
    }

    #[test]
    fn test_task_reward_credited_at_most_once() {
        let mut economy = engine(0, 50);

        let event = economy.complete_task("t2").unwrap();
        assert_eq!(event.xp(), 20);
        assert_eq!(economy.balance(), 20);
        assert_eq!(economy.happiness(), 52);

        let err = economy.complete_task("t2").unwrap_err();
        assert_eq!(err, EconomyError::AlreadyCompleted);
        assert_eq!(economy.balance(), 20);
        assert_eq!(economy.happiness(), 52);
    }

    #[test]
    fn test_catalog_precompleted_task_not_rewardable() {
        // t1 ships completed in the default catalog
        let mut economy = engine(0, 50);
        assert_eq!(
            economy.complete_task("t1").unwrap_err(),
            EconomyError::AlreadyCompleted
        );
        assert_eq!(economy.balance(), 0);
    }

    #[test]
    fn test_unknown_task_rejected() {
        let mut economy = engine(0, 50);
        assert!(matches!(
            economy.complete_task("t99"),
            Err(EconomyError::UnknownTask(_))
        ));
    }

    #[test]
    fn test_purchase_debits_exactly_price() {
        let mut economy = engine(100, 50);
        economy.purchase("apple").unwrap();
        assert_eq!(economy.balance(), 85);
        assert_eq!(economy.inventory_count("apple"), 1);
    }

    #[test]
    fn test_insufficient_funds_leaves_state_untouched() {
        let mut economy = engine(10, 50);
        let err = economy.purchase("apple").unwrap_err();
        assert_eq!(
            err,
            EconomyError::InsufficientFunds {
                balance: 10,
                price: 15,
            }
        );
        assert_eq!(economy.balance(), 10);
        assert_eq!(economy.inventory_count("apple"), 0);
    }

    #[test]
    fn test_inventory_is_a_multiset() {
        let mut economy = engine(100, 0);
        economy.purchase("carrot").unwrap();
        economy.purchase("carrot").unwrap();
        assert_eq!(economy.inventory_count("carrot"), 2);

        economy.feed("carrot").unwrap();
        assert_eq!(economy.inventory_count("carrot"), 1);
        economy.feed("carrot").unwrap();
        assert_eq!(economy.inventory_count("carrot"), 0);

        assert_eq!(economy.feed("carrot").unwrap_err(), EconomyError::EmptyInventory);
    }

    #[test]
    fn test_feed_rejected_when_satisfied_keeps_inventory() {
        let mut economy = engine(100, 100);
        economy.purchase("apple").unwrap();

        let err = economy.feed("apple").unwrap_err();
        assert_eq!(err, EconomyError::PetSatisfied);
        assert_eq!(economy.inventory_count("apple"), 1);
        assert_eq!(economy.happiness(), 100);
    }

    #[test]
    fn test_feed_boost_clamps_to_cap() {
        let mut economy = engine(100, 95);
        economy.purchase("star-fruit").unwrap();

        // +20 boost from 95 lands exactly on the cap
        assert_eq!(economy.feed("star-fruit").unwrap(), 100);
        assert_eq!(economy.happiness(), 100);
    }

    #[test]
    fn test_feed_empty_inventory_rejected() {
        let mut economy = engine(100, 50);
        assert_eq!(economy.feed("cake").unwrap_err(), EconomyError::EmptyInventory);
        assert_eq!(economy.happiness(), 50);
    }

    #[test]
    fn test_lesson_and_quiz_awards() {
        let mut economy = engine(0, 50);

        let event = economy.award_lesson_completion("l6", 15);
        assert_eq!(event.xp(), 15);
        assert_eq!(economy.balance(), 15);
        assert_eq!(economy.happiness(), 53);

        economy.award_quiz_pass("l3", 25, 3, 3);
        assert_eq!(economy.balance(), 40);
        assert_eq!(economy.happiness(), 56);
    }

    #[test]
    fn test_happiness_stays_in_bounds_under_any_sequence() {
        let mut economy = engine(1000, 0);
        for _ in 0..20 {
            economy.purchase("star-fruit").unwrap_or(());
            let _ = economy.feed("star-fruit");
            let _ = economy.complete_task("t3");
        }
        assert!(economy.happiness() <= 100);
        assert!(economy.balance() <= 1000);
    }
}
