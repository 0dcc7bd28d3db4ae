//! This module is for testing only

use std::rc::Rc;
use std::cell::RefCell;

pub type DropFlag<T> = Rc<RefCell<T>>;

/// A shared counter incremented by every drop of a tracked value.
pub fn drop_counter() -> DropFlag<usize> {
    DropFlag::new(RefCell::new(0))
}

/// Counts its drops. Clones share the counter, so the counter tracks every copy.
#[derive(Debug)]
pub struct Droppable {
    pub id: i32,
    pub dropflag: DropFlag<usize>,
}

impl Droppable {
    pub fn new(id: i32, dropflag: &DropFlag<usize>) -> Droppable {
        Droppable { id, dropflag: dropflag.clone() }
    }
}

impl Clone for Droppable {
    fn clone(&self) -> Self {
        Droppable::new(self.id, &self.dropflag)
    }
}

impl PartialEq for Droppable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Drop for Droppable {
    fn drop(&mut self) {
        *self.dropflag.borrow_mut() += 1;
    }
}

/// Clones succeed while the shared budget lasts, then panic.
#[derive(Debug)]
pub struct FragileClone {
    pub id: i32,
    pub budget: DropFlag<usize>,
    pub dropflag: DropFlag<usize>,
}

impl FragileClone {
    /// `count` values sharing one budget of `clones` successful clones.
    pub fn batch(count: i32, clones: usize, dropflag: &DropFlag<usize>) -> Vec<FragileClone> {
        let budget = DropFlag::new(RefCell::new(clones));
        (0..count)
            .map(|id| FragileClone { id, budget: budget.clone(), dropflag: dropflag.clone() })
            .collect()
    }
}

impl Clone for FragileClone {
    fn clone(&self) -> Self {
        let remaining = *self.budget.borrow();
        if remaining == 0 {
            panic!("clone budget exhausted at {}", self.id);
        }
        *self.budget.borrow_mut() = remaining - 1;
        FragileClone { id: self.id, budget: self.budget.clone(), dropflag: self.dropflag.clone() }
    }
}

impl Drop for FragileClone {
    fn drop(&mut self) {
        *self.dropflag.borrow_mut() += 1;
    }
}

/// A shared log of ids, appended to in drop order.
pub fn drop_log() -> DropFlag<Vec<i32>> {
    DropFlag::new(RefCell::new(Vec::new()))
}

/// Records its id in the shared log when dropped.
pub struct Logged {
    pub id: i32,
    pub log: DropFlag<Vec<i32>>,
}

impl Logged {
    pub fn new(id: i32, log: &DropFlag<Vec<i32>>) -> Logged {
        Logged { id, log: log.clone() }
    }
}

impl Drop for Logged {
    fn drop(&mut self) {
        self.log.borrow_mut().push(self.id);
    }
}

#[test]
fn dropflag() {
    let flag = drop_counter();
    let droppable = Droppable::new(1, &flag);
    let copy = droppable.clone();
    assert_eq!(0, *flag.borrow());
    std::mem::drop(droppable);
    assert_eq!(1, *flag.borrow());
    std::mem::drop(copy);
    assert_eq!(2, *flag.borrow());
}

#[test]
fn fragile_clone_panics_when_budget_is_spent() {
    let flag = drop_counter();
    let items = FragileClone::batch(1, 1, &flag);
    let _copy = items[0].clone();
    assert!(std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| items[0].clone())).is_err());
}
