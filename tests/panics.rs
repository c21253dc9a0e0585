//! State of containers after a clone or a constructor panics.

extern crate sized_any;

use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use sized_any::space::*;
use sized_any::SizedAny;

struct Fragile {
    armed: bool,
    drops: Rc<Cell<usize>>,
}

impl Fragile {
    fn new(armed: bool, drops: &Rc<Cell<usize>>) -> Self {
        Fragile {
            armed,
            drops: drops.clone(),
        }
    }
}

impl Clone for Fragile {
    fn clone(&self) -> Self {
        if self.armed {
            panic!("clone failed");
        }
        Fragile::new(false, &self.drops)
    }
}

impl Drop for Fragile {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

#[test]
fn failed_clone_assignment_keeps_previous_value() {
    let drops = Rc::new(Cell::new(0));
    let mut target = SizedAny::<S4>::new(String::from("kept"));
    let source = SizedAny::<S4>::new(Fragile::new(true, &drops));

    let result = catch_unwind(AssertUnwindSafe(|| target.assign_clone(&source)));
    assert!(result.is_err());
    assert_eq!(target.downcast_ref::<String>().unwrap(), "kept");
    assert!(source.is::<Fragile>());
    assert_eq!(drops.get(), 0);

    let result = catch_unwind(AssertUnwindSafe(|| target.clone_from(&source)));
    assert!(result.is_err());
    assert_eq!(target.downcast_ref::<String>().unwrap(), "kept");
}

#[test]
fn failed_clone_into_heap_keeps_previous_value() {
    let drops = Rc::new(Cell::new(0));
    let mut target = SizedAny::<S1>::new((Fragile::new(false, &drops), 0usize));
    let source = SizedAny::<S1>::new((Fragile::new(true, &drops), 1usize));

    let result = catch_unwind(AssertUnwindSafe(|| target.assign_clone(&source)));
    assert!(result.is_err());
    assert_eq!(target.downcast_ref::<(Fragile, usize)>().map(|v| v.1), Some(0));
    assert_eq!(drops.get(), 0);

    drop(target);
    drop(source);
    assert_eq!(drops.get(), 2);
}

#[test]
fn failed_clone_leaves_source_intact() {
    let drops = Rc::new(Cell::new(0));
    let source = SizedAny::<S1>::new(Fragile::new(true, &drops));

    assert!(catch_unwind(AssertUnwindSafe(|| source.clone())).is_err());
    assert!(catch_unwind(AssertUnwindSafe(|| SizedAny::<S4>::cloned_from(&source))).is_err());
    assert!(source.is::<Fragile>());
    assert_eq!(drops.get(), 0);

    drop(source);
    assert_eq!(drops.get(), 1);
}

#[test]
fn failed_emplace_leaves_container_empty() {
    let drops = Rc::new(Cell::new(0));
    let mut inline = SizedAny::<S4>::new(Fragile::new(false, &drops));

    let result = catch_unwind(AssertUnwindSafe(|| {
        inline.emplace_with(|| -> u32 { panic!("constructor failed") });
    }));
    assert!(result.is_err());
    assert!(!inline.has_value());
    assert_eq!(drops.get(), 1);

    inline.set(3u32);
    assert_eq!(inline.downcast_ref::<u32>(), Some(&3));
}

#[test]
fn failed_emplace_over_reused_block_leaves_container_empty() {
    let drops = Rc::new(Cell::new(0));
    let mut heaped = SizedAny::<S1>::new((Fragile::new(false, &drops), 0usize));
    assert!(heaped.is_heap());

    let result = catch_unwind(AssertUnwindSafe(|| {
        heaped.emplace_with(|| -> (Fragile, usize) { panic!("constructor failed") });
    }));
    assert!(result.is_err());
    assert!(!heaped.has_value());
    assert!(!heaped.is_heap());
    assert_eq!(drops.get(), 1);

    let result = catch_unwind(AssertUnwindSafe(|| {
        SizedAny::<S1>::new_with(|| -> [u64; 8] { panic!("constructor failed") })
    }));
    assert!(result.is_err());
}
