//! Contracts with the form framework that hosts the control.
//!
//! The host owns the form model; the control only queries it through
//! [`HostControl`] and [`ParentForm`], and tells it to re-render through
//! [`StateChanges`].

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::types::Segment;

/// Validity of the form control bound to this input
pub trait HostControl {
    fn invalid(&self) -> bool;
    fn touched(&self) -> bool;
    /// Whether the bound control currently holds a value
    fn has_value(&self) -> bool;
}

/// The form or form group the control lives in
pub trait ParentForm {
    fn submitted(&self) -> bool;
}

/// Decides whether the host control should display its error
pub trait ErrorStateMatcher {
    fn is_error_state(
        &self,
        control: Option<&dyn HostControl>,
        form: Option<&dyn ParentForm>,
    ) -> bool;
}

impl<F> ErrorStateMatcher for F
where
    F: Fn(Option<&dyn HostControl>, Option<&dyn ParentForm>) -> bool,
{
    fn is_error_state(
        &self,
        control: Option<&dyn HostControl>,
        form: Option<&dyn ParentForm>,
    ) -> bool {
        self(control, form)
    }
}

/// Invalid and either touched or submitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultErrorStateMatcher;

impl ErrorStateMatcher for DefaultErrorStateMatcher {
    fn is_error_state(
        &self,
        control: Option<&dyn HostControl>,
        form: Option<&dyn ParentForm>,
    ) -> bool {
        control.is_some_and(|control| {
            control.invalid() && (control.touched() || form.is_some_and(ParentForm::submitted))
        })
    }
}

/// Host references handed to the control at construction
pub struct HostContext {
    pub control: Option<Rc<dyn HostControl>>,
    pub parent_form: Option<Rc<dyn ParentForm>>,
    pub matcher: Box<dyn ErrorStateMatcher>,
}

impl HostContext {
    /// A context with no bound control, no parent form and the default matcher
    pub fn detached() -> Self {
        Self {
            control: None,
            parent_form: None,
            matcher: Box::new(DefaultErrorStateMatcher),
        }
    }

    #[must_use]
    pub fn with_control(mut self, control: Rc<dyn HostControl>) -> Self {
        self.control = Some(control);
        self
    }

    #[must_use]
    pub fn with_parent_form(mut self, form: Rc<dyn ParentForm>) -> Self {
        self.parent_form = Some(form);
        self
    }

    #[must_use]
    pub fn with_matcher(mut self, matcher: impl ErrorStateMatcher + 'static) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    /// Runs the matcher against the current host state
    pub fn is_error_state(&self) -> bool {
        self.matcher
            .is_error_state(self.control.as_deref(), self.parent_form.as_deref())
    }
}

impl Default for HostContext {
    fn default() -> Self {
        Self::detached()
    }
}

impl fmt::Debug for HostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostContext")
            .field("control", &self.control.is_some())
            .field("parent_form", &self.parent_form.is_some())
            .finish_non_exhaustive()
    }
}

/// How focus entered the control, as reported by the host's focus monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusOrigin {
    Mouse,
    Keyboard,
    Touch,
    Program,
}

/// Element that received a click inside the form-field container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickTarget {
    /// One of the segment inputs
    Input(Segment),
    /// Anything else inside the container (label, padding, icon)
    Container,
}

type Listener = Box<dyn FnMut()>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
    /// Ids unsubscribed while their listener was out for dispatch
    dropped: Vec<u64>,
    closed: bool,
}

/// Notification stream the host subscribes to for re-rendering.
///
/// Listeners are held until their [`Subscription`] is dropped or the stream
/// completes. Once completed, no listener ever runs again.
#[derive(Clone, Default)]
pub struct StateChanges {
    inner: Rc<RefCell<Listeners>>,
}

impl StateChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener; it stays registered while the guard lives
    pub fn subscribe(&self, listener: impl FnMut() + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        if !inner.closed {
            inner.entries.push((id, Box::new(listener)));
        }
        Subscription {
            id,
            listeners: Rc::downgrade(&self.inner),
        }
    }

    /// Calls every listener once
    pub(crate) fn notify(&self) {
        let mut taken = {
            let mut inner = self.inner.borrow_mut();
            if inner.closed {
                return;
            }
            std::mem::take(&mut inner.entries)
        };

        for (_, listener) in &mut taken {
            listener();
        }

        let mut inner = self.inner.borrow_mut();
        if inner.closed {
            return;
        }
        let dropped = std::mem::take(&mut inner.dropped);
        taken.retain(|(id, _)| !dropped.contains(id));
        let added = std::mem::replace(&mut inner.entries, taken);
        inner.entries.extend(added);
    }

    /// Releases every listener and refuses new ones
    pub(crate) fn complete(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.closed = true;
        inner.entries.clear();
        inner.dropped.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }
}

impl fmt::Debug for StateChanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("StateChanges")
            .field("listeners", &inner.entries.len())
            .field("closed", &inner.closed)
            .finish()
    }
}

/// Keeps a [`StateChanges`] listener registered; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes immediately"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    listeners: Weak<RefCell<Listeners>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(listeners) = self.listeners.upgrade() else {
            return;
        };
        let Ok(mut inner) = listeners.try_borrow_mut() else {
            return;
        };
        if inner.closed {
            return;
        }
        if let Some(pos) = inner.entries.iter().position(|(id, _)| *id == self.id) {
            drop(inner.entries.remove(pos));
        } else {
            inner.dropped.push(self.id);
        }
    }
}
