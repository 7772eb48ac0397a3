//! Bound callbacks and their identity keys.
//!
//! A [`Handler`] wraps one of four binding shapes: a free function with or
//! without an argument, or an object method with or without an argument. Two
//! handlers are the *same* handler when their [`HandlerKey`]s are equal, which
//! compares the binding shape, the argument type and the underlying function
//! pointer (plus receiver identity for methods). Equality never depends on the
//! `Handler` value itself, so an independently constructed but equivalent
//! handler deduplicates and removes like the one it mirrors.
//!
//! Function identity is a code address. Handlers meant to be told apart must
//! be distinct functions with distinct bodies; the optimizer may fold
//! functions with identical machine code into one address.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::{Arc, Weak};

/// Shape of a handler binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// `fn(&S, T)`
    Function,
    /// `fn(&S)`
    FunctionNoArg,
    /// `fn(&O, &S, T)` bound to a receiver `O`
    Method,
    /// `fn(&O, &S)` bound to a receiver `O`
    MethodNoArg,
}

/// Identity of a method receiver: its concrete type and allocation address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ReceiverId {
    type_id: TypeId,
    addr: usize,
}

/// Value-comparable identity of a handler binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerKey {
    kind: BindingKind,
    arg_type: TypeId,
    callable: usize,
    receiver: Option<ReceiverId>,
}

impl HandlerKey {
    /// Binding shape.
    #[must_use]
    pub const fn kind(&self) -> BindingKind {
        self.kind
    }

    /// Type of the event argument the handler accepts.
    #[must_use]
    pub const fn arg_type(&self) -> TypeId {
        self.arg_type
    }
}

enum Binding<T, S> {
    Function(fn(&S, T)),
    FunctionNoArg(fn(&S)),
    Method {
        receiver: Weak<dyn Any + Send + Sync>,
        invoke: Arc<dyn Fn(&S, T) -> bool + Send + Sync>,
    },
}

impl<T, S> Clone for Binding<T, S> {
    fn clone(&self) -> Self {
        match self {
            Self::Function(f) => Self::Function(*f),
            Self::FunctionNoArg(f) => Self::FunctionNoArg(*f),
            Self::Method { receiver, invoke } => Self::Method {
                receiver: receiver.clone(),
                invoke: Arc::clone(invoke),
            },
        }
    }
}

/// A callback bound to a free function or an object method, invoked with a
/// sender reference and an argument of type `T`.
///
/// Method handlers hold their receiver weakly: registering a handler never
/// keeps the object alive, and once the object is dropped the handler is
/// inert and skipped by notification.
pub struct Handler<T, S = ()> {
    key: HandlerKey,
    binding: Binding<T, S>,
}

impl<T: 'static, S: 'static> Handler<T, S> {
    /// Bind a free function taking the sender and the argument.
    #[must_use]
    pub fn function(func: fn(&S, T)) -> Self {
        Self {
            key: HandlerKey {
                kind: BindingKind::Function,
                arg_type: TypeId::of::<T>(),
                callable: func as usize,
                receiver: None,
            },
            binding: Binding::Function(func),
        }
    }

    /// Bind `method` on `receiver`.
    #[must_use]
    pub fn method<O>(receiver: &Arc<O>, method: fn(&O, &S, T)) -> Self
    where
        O: Send + Sync + 'static,
    {
        let weak = Arc::downgrade(receiver);
        let invoke = move |sender: &S, arg: T| {
            weak.upgrade()
                .map(|obj| method(&obj, sender, arg))
                .is_some()
        };
        Self::bound(BindingKind::Method, receiver, method as usize, Arc::new(invoke))
    }

    fn bound<O>(
        kind: BindingKind,
        receiver: &Arc<O>,
        callable: usize,
        invoke: Arc<dyn Fn(&S, T) -> bool + Send + Sync>,
    ) -> Self
    where
        O: Send + Sync + 'static,
    {
        let weak: Weak<O> = Arc::downgrade(receiver);
        let erased: Weak<dyn Any + Send + Sync> = weak;
        Self {
            key: HandlerKey {
                kind,
                arg_type: TypeId::of::<T>(),
                callable,
                receiver: Some(ReceiverId {
                    type_id: TypeId::of::<O>(),
                    addr: Arc::as_ptr(receiver).cast::<()>() as usize,
                }),
            },
            binding: Binding::Method {
                receiver: erased,
                invoke,
            },
        }
    }
}

impl<S: 'static> Handler<(), S> {
    /// Bind a free function taking only the sender.
    #[must_use]
    pub fn function_no_arg(func: fn(&S)) -> Self {
        Self {
            key: HandlerKey {
                kind: BindingKind::FunctionNoArg,
                arg_type: TypeId::of::<()>(),
                callable: func as usize,
                receiver: None,
            },
            binding: Binding::FunctionNoArg(func),
        }
    }

    /// Bind a sender-only `method` on `receiver`.
    #[must_use]
    pub fn method_no_arg<O>(receiver: &Arc<O>, method: fn(&O, &S)) -> Self
    where
        O: Send + Sync + 'static,
    {
        let weak = Arc::downgrade(receiver);
        let invoke = move |sender: &S, (): ()| {
            weak.upgrade().map(|obj| method(&obj, sender)).is_some()
        };
        Self::bound(
            BindingKind::MethodNoArg,
            receiver,
            method as usize,
            Arc::new(invoke),
        )
    }
}

impl<T, S> Handler<T, S> {
    /// Identity key used for deduplication and removal.
    #[must_use]
    pub const fn key(&self) -> HandlerKey {
        self.key
    }

    /// Binding shape.
    #[must_use]
    pub const fn kind(&self) -> BindingKind {
        self.key.kind
    }

    /// Whether `other` is bound to the same function (and receiver).
    #[must_use]
    pub fn is_same_binding(&self, other: &Self) -> bool {
        self.key == other.key
    }

    /// `false` once a method handler's receiver has been dropped.
    #[must_use]
    pub fn is_live(&self) -> bool {
        match &self.binding {
            Binding::Function(_) | Binding::FunctionNoArg(_) => true,
            Binding::Method { receiver, .. } => receiver.strong_count() > 0,
        }
    }

    /// Synchronous entry point: call the bound function in place.
    ///
    /// Returns `false` without calling anything when a method handler's
    /// receiver is already gone. A panic inside the callback propagates to
    /// the caller.
    pub fn invoke(&self, sender: &S, arg: T) -> bool {
        match &self.binding {
            Binding::Function(f) => {
                f(sender, arg);
                true
            }
            Binding::FunctionNoArg(f) => {
                f(sender);
                true
            }
            Binding::Method { invoke, .. } => invoke(sender, arg),
        }
    }
}

impl<T, S> Clone for Handler<T, S> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            binding: self.binding.clone(),
        }
    }
}

impl<T, S> PartialEq for Handler<T, S> {
    fn eq(&self, other: &Self) -> bool {
        self.is_same_binding(other)
    }
}

impl<T, S> Eq for Handler<T, S> {}

impl<T, S> fmt::Debug for Handler<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("kind", &self.key.kind)
            .field("live", &self.is_live())
            .finish_non_exhaustive()
    }
}
