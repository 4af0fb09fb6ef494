//! Random interleavings of local edits, remote edits, saves and
//! acknowledgments against a modelled authority, for property maps and for
//! item sets.
//!
//! The authority applies remote edits as they are generated and applies the
//! in-flight batch when it is acknowledged. Canonical must track it exactly.
//! A local edit must land on the buffered snapshot as if applied to it
//! directly. A remote edit must leave every key or item with a pending local
//! edit as the buffered snapshot showed it, and show the authority's state
//! everywhere else. Flushing everything pending must land on the buffered
//! snapshot.

use docsync_common::{read_property, write_property, ItemSet, PropertyMap, Value};
use docsync_engine::{LifecycleState, Operation, Reference, SyncError};
use docsync_operations::{CollectionOp, PropertyOp, SetChange, SetProperties, SetProperty};
use proptest::prelude::*;
use serde_json::json;
use std::collections::BTreeSet;
use std::fmt;

/// A snapshot shape, its operation type and a way to generate edits for it
trait Model {
    type Snapshot: Clone + PartialEq + Default + fmt::Debug;
    type Op: Operation<Snapshot = Self::Snapshot> + fmt::Display;
    type Edit: Clone + fmt::Debug + 'static;
    type Key: Ord + Clone;

    fn edit() -> BoxedStrategy<Self::Edit>;

    /// Operation performing `edit` on `base`, or `None` when it changes nothing
    fn build(edit: &Self::Edit, base: &Self::Snapshot) -> Option<Self::Op>;

    /// Keys or items the operation writes
    fn touched(op: &Self::Op) -> Vec<Self::Key>;

    /// `fresh`, except that every key in `keys` reads as it does in `kept`
    fn overlay(
        kept: &Self::Snapshot,
        fresh: &Self::Snapshot,
        keys: &BTreeSet<Self::Key>,
    ) -> Self::Snapshot;
}

#[derive(Debug, Clone)]
enum Step<E> {
    Local(E),
    Remote(E),
    Save,
    Ack,
}

fn steps<M: Model>() -> impl Strategy<Value = Vec<Step<M::Edit>>> {
    let step = prop_oneof![
        3 => M::edit().prop_map(Step::Local),
        3 => M::edit().prop_map(Step::Remote),
        1 => Just(Step::Save),
        1 => Just(Step::Ack),
    ];

    proptest::collection::vec(step, 0..40)
}

fn fail(error: SyncError) -> TestCaseError {
    TestCaseError::fail(error.to_string())
}

fn pending_keys<M: Model>(reference: &Reference<M::Op>) -> BTreeSet<M::Key> {
    reference
        .in_flight()
        .into_iter()
        .chain(reference.buffer())
        .flat_map(|batch| batch.operations())
        .flat_map(|op| M::touched(op))
        .collect()
}

fn acknowledge<M: Model>(
    reference: &mut Reference<M::Op>,
    authority: &mut M::Snapshot,
) -> Result<(), TestCaseError> {
    if let Some(batch) = reference.in_flight() {
        for operation in batch.operations() {
            prop_assert!(
                operation.test(authority),
                "in-flight {} does not fit the authority {:?}",
                operation,
                authority
            );
            operation.apply(authority);
        }
    }

    reference.saved().map_err(fail)
}

fn run<M: Model>(steps: &[Step<M::Edit>]) -> Result<(), TestCaseError> {
    let mut reference = Reference::<M::Op>::new("doc", "1");
    let mut authority = M::Snapshot::default();

    for step in steps {
        match step {
            Step::Local(edit) => {
                let mut expected = reference.buffered_snapshot();

                if let Some(operation) = M::build(edit, &expected) {
                    operation.apply(&mut expected);
                    reference.apply_to_buffer(operation).map_err(fail)?;

                    prop_assert_eq!(reference.buffered_snapshot(), expected);
                }
            }
            Step::Remote(edit) => {
                if let Some(operation) = M::build(edit, &authority) {
                    let before = reference.buffered_snapshot();
                    let kept = pending_keys::<M>(&reference);

                    operation.apply(&mut authority);
                    reference.apply_to_canonical(operation).map_err(fail)?;

                    prop_assert_eq!(
                        reference.buffered_snapshot(),
                        M::overlay(&before, &authority, &kept)
                    );
                }
            }
            Step::Save => match reference.state() {
                LifecycleState::Dirty => reference.saving().map_err(fail)?,
                LifecycleState::Saving => {
                    prop_assert!(matches!(
                        reference.saving(),
                        Err(SyncError::SaveInProgress(_))
                    ));
                }
                LifecycleState::Idle => {
                    prop_assert!(matches!(reference.saving(), Err(SyncError::EmptyBuffer(_))));
                }
            },
            Step::Ack => {
                if reference.is_saving() {
                    let expected = reference.buffered_snapshot();
                    acknowledge::<M>(&mut reference, &mut authority)?;
                    prop_assert_eq!(reference.buffered_snapshot(), expected);
                } else {
                    prop_assert!(matches!(
                        reference.saved(),
                        Err(SyncError::NothingInFlight(_))
                    ));
                }
            }
        }

        prop_assert_eq!(reference.canonical_snapshot(), &authority);
        prop_assert_eq!(
            reference.is_dirty(),
            reference.buffer().is_some() || reference.in_flight().is_some()
        );
    }

    let pending = reference.buffered_snapshot();

    if reference.is_saving() {
        acknowledge::<M>(&mut reference, &mut authority)?;
    }
    if reference.is_dirty() {
        reference.saving().map_err(fail)?;
        acknowledge::<M>(&mut reference, &mut authority)?;
    }

    prop_assert_eq!(reference.canonical_snapshot(), &pending);
    prop_assert_eq!(&authority, &pending);
    prop_assert!(!reference.is_dirty());

    Ok(())
}

// ---------------------------------------------------------------------------
// Property maps
// ---------------------------------------------------------------------------

const PROPERTIES: [&str; 3] = ["firstName", "lastName", "age"];

#[derive(Debug, Clone)]
enum PropertyEdit {
    Set(usize, Option<u8>),
    Batch(Vec<(usize, Option<u8>)>),
}

fn value(raw: Option<u8>) -> Value {
    raw.map_or(Value::Null, |n| json!(n))
}

fn assignment() -> impl Strategy<Value = (usize, Option<u8>)> {
    (0..PROPERTIES.len(), proptest::option::of(0u8..3))
}

struct Properties;

impl Model for Properties {
    type Snapshot = PropertyMap;
    type Op = PropertyOp;
    type Edit = PropertyEdit;
    type Key = String;

    fn edit() -> BoxedStrategy<PropertyEdit> {
        prop_oneof![
            3 => assignment().prop_map(|(p, v)| PropertyEdit::Set(p, v)),
            1 => proptest::collection::vec(assignment(), 1..4).prop_map(PropertyEdit::Batch),
        ]
        .boxed()
    }

    fn build(edit: &PropertyEdit, base: &PropertyMap) -> Option<PropertyOp> {
        match edit {
            PropertyEdit::Set(index, raw) => {
                let property = PROPERTIES[*index];
                let old = read_property(base, property).clone();
                let new = value(*raw);

                (old != new).then(|| SetProperty::new(property, old, new).into())
            }
            PropertyEdit::Batch(assignments) => {
                let batch = assignments
                    .iter()
                    .fold(SetProperties::new(), |batch, (index, raw)| {
                        let property = PROPERTIES[*index];
                        let old = read_property(base, property).clone();
                        batch.with(property, old, value(*raw))
                    });

                (!batch.is_empty()).then(|| batch.into())
            }
        }
    }

    fn touched(op: &PropertyOp) -> Vec<String> {
        match op {
            PropertyOp::Set(set) => vec![set.property.clone()],
            PropertyOp::Batch(batch) => batch.changes.keys().cloned().collect(),
        }
    }

    fn overlay(kept: &PropertyMap, fresh: &PropertyMap, keys: &BTreeSet<String>) -> PropertyMap {
        let mut result = fresh.clone();
        for key in keys {
            write_property(&mut result, key, read_property(kept, key));
        }
        result
    }
}

// ---------------------------------------------------------------------------
// Item sets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum ItemEdit {
    /// Add the item if it is absent, remove it otherwise
    Toggle(u8),
    /// Toggle several items in one set change
    Change(Vec<u8>),
}

struct Items;

impl Model for Items {
    type Snapshot = ItemSet<u8>;
    type Op = CollectionOp<u8>;
    type Edit = ItemEdit;
    type Key = u8;

    fn edit() -> BoxedStrategy<ItemEdit> {
        prop_oneof![
            3 => (0u8..4).prop_map(ItemEdit::Toggle),
            2 => proptest::collection::vec(0u8..4, 1..4).prop_map(ItemEdit::Change),
        ]
        .boxed()
    }

    fn build(edit: &ItemEdit, base: &ItemSet<u8>) -> Option<CollectionOp<u8>> {
        match edit {
            ItemEdit::Toggle(item) if base.contains(item) => Some(CollectionOp::remove(*item)),
            ItemEdit::Toggle(item) => Some(CollectionOp::add(*item)),
            ItemEdit::Change(items) => {
                let items: BTreeSet<u8> = items.iter().copied().collect();
                let (present, absent): (Vec<u8>, Vec<u8>) =
                    items.into_iter().partition(|item| base.contains(item));

                Some(SetChange::new().adding(absent).removing(present).into())
            }
        }
    }

    fn touched(op: &CollectionOp<u8>) -> Vec<u8> {
        match op {
            CollectionOp::Member(membership) => membership.item().copied().into_iter().collect(),
            CollectionOp::Change(change) => change.add.iter().chain(&change.remove).copied().collect(),
        }
    }

    fn overlay(kept: &ItemSet<u8>, fresh: &ItemSet<u8>, keys: &BTreeSet<u8>) -> ItemSet<u8> {
        let mut result = fresh.clone();
        for key in keys {
            if kept.contains(key) {
                result.insert(*key);
            } else {
                result.remove(key);
            }
        }
        result
    }
}

proptest! {
    #[test]
    fn prop_property_map_tracks_authority(steps in steps::<Properties>()) {
        run::<Properties>(&steps)?;
    }

    #[test]
    fn prop_item_set_tracks_authority(steps in steps::<Items>()) {
        run::<Items>(&steps)?;
    }
}
