//! Lexically scoped environments: a name→value map per block, chained to
//! the enclosing block for outward lookup.

use alloc::rc::Rc;
use alloc::string::String;
use core::cell::RefCell;

use hashbrown::HashMap;

use crate::value::Value;

pub type EnvRef = Rc<RefCell<Env>>;

pub struct Env {
    vars: HashMap<String, Value>,
    parent: Option<EnvRef>,
}

impl Env {
    pub fn new(parent: Option<EnvRef>) -> EnvRef {
        Rc::new(RefCell::new(Env {
            vars: HashMap::new(),
            parent,
        }))
    }

    /// True when the name is bound in this scope, ignoring parents.
    /// Declarations use this to reject redefinition in the same scope.
    pub fn has_local(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Binds a name in this scope, shadowing any outer binding.
    pub fn define(&mut self, name: &str, value: Value) {
        self.vars.insert(String::from(name), value);
    }

    /// Looks a name up through the scope chain.
    pub fn get(env: &EnvRef, name: &str) -> Option<Value> {
        let mut current = env.clone();
        loop {
            if let Some(value) = current.borrow().vars.get(name) {
                return Some(value.clone());
            }
            let parent = current.borrow().parent.clone();
            match parent {
                Some(parent) => current = parent,
                None => return None,
            }
        }
    }

    /// Overwrites the binding wherever the name resolves in the chain.
    /// Reports whether a binding was found.
    pub fn assign(env: &EnvRef, name: &str, value: Value) -> bool {
        let mut current = env.clone();
        loop {
            if let Some(slot) = current.borrow_mut().vars.get_mut(name) {
                *slot = value;
                return true;
            }
            let parent = current.borrow().parent.clone();
            match parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }
}
