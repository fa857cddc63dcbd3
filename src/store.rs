//! The declaration registry.
//!
//! A [`TypeStore`] holds every generic type declaration a host application
//! wants to match against: its name, its type parameters (with bounds), and
//! its declared supertypes. Declarations are addressed by [`DeclId`] indices,
//! which is what lets a bound like `T extends Comparable<T>` reference its
//! own declaration without creating an ownership cycle.
//!
//! Construction is two-phase: [`TypeStore::declare`] registers the name and
//! parameter list, after which bounds and supertype clauses may be attached
//! with specs that reference the fresh id. The store is mutated only during
//! setup; matching borrows it immutably, so one store may serve any number
//! of engines on any number of threads.

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::spec::{TypeKind, TypeSpec, VariableSpec};

/// Index of a declaration inside a [`TypeStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeclId {
    index: u32,
}

impl DeclId {
    pub(crate) fn new(index: u32) -> Self {
        Self { index }
    }

    /// The raw index of this declaration.
    pub fn index(&self) -> u32 {
        self.index
    }
}

/// The kind of entity that introduced a set of type parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclKind {
    /// A class or interface declaration.
    Class,
    /// A generic method declaration.
    Method,
}

/// A declared type parameter: a name plus the bounds it must extend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeParam {
    pub name: String,
    /// Conjunctive upper bounds; empty means unbounded.
    pub bounds: Vec<TypeSpec>,
}

/// A generic type declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub kind: DeclKind,
    pub params: Vec<TypeParam>,
    /// `extends`/`implements` clauses, expressed over this declaration's
    /// own parameters.
    pub supertypes: Vec<TypeSpec>,
}

/// Registry of generic type declarations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeStore {
    decls: IndexMap<String, TypeDecl, FxBuildHasher>,
}

impl TypeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class or interface declaration with the given type
    /// parameter names. Bounds and supertypes are attached afterwards.
    pub fn declare(&mut self, name: &str, params: &[&str]) -> Result<DeclId, Error> {
        self.insert(name, DeclKind::Class, params)
    }

    /// Register a generic method declaration. Methods introduce type
    /// parameters but carry no supertype clauses.
    pub fn declare_method(&mut self, name: &str, params: &[&str]) -> Result<DeclId, Error> {
        self.insert(name, DeclKind::Method, params)
    }

    fn insert(&mut self, name: &str, kind: DeclKind, params: &[&str]) -> Result<DeclId, Error> {
        if self.decls.contains_key(name) {
            return Err(Error::DuplicateDeclaration(name.to_string()));
        }
        let id = DeclId::new(self.decls.len() as u32);
        let decl = TypeDecl {
            name: name.to_string(),
            kind,
            params: params
                .iter()
                .map(|p| TypeParam {
                    name: (*p).to_string(),
                    bounds: Vec::new(),
                })
                .collect(),
            supertypes: Vec::new(),
        };
        self.decls.insert(name.to_string(), decl);
        Ok(id)
    }

    /// Attach bounds to a declared type parameter. The bounds may reference
    /// the declaring id itself.
    pub fn set_param_bounds(
        &mut self,
        decl: DeclId,
        index: usize,
        bounds: Vec<TypeSpec>,
    ) -> Result<(), Error> {
        for bound in &bounds {
            self.validate_spec(bound)?;
        }
        let entry = self
            .decl_mut(decl)
            .ok_or(Error::UnknownDeclaration(decl))?;
        let count = entry.params.len();
        let name = entry.name.clone();
        match entry.params.get_mut(index) {
            Some(param) => {
                param.bounds = bounds;
                Ok(())
            }
            None => Err(Error::ParamIndexOutOfRange {
                decl: name,
                index,
                count,
            }),
        }
    }

    /// Attach a supertype clause to a declaration. The clause is a spec over
    /// the declaration's own parameters, e.g. `List<E>` on `ArrayList<E>`.
    pub fn add_supertype(&mut self, decl: DeclId, supertype: TypeSpec) -> Result<(), Error> {
        self.validate_spec(&supertype)?;
        let entry = self
            .decl_mut(decl)
            .ok_or(Error::UnknownDeclaration(decl))?;
        entry.supertypes.push(supertype);
        Ok(())
    }

    /// Look up a declaration by id.
    pub fn decl(&self, id: DeclId) -> Option<&TypeDecl> {
        self.decls.get_index(id.index as usize).map(|(_, d)| d)
    }

    fn decl_mut(&mut self, id: DeclId) -> Option<&mut TypeDecl> {
        self.decls.get_index_mut(id.index as usize).map(|(_, d)| d)
    }

    /// Look up a declaration id by name.
    pub fn find(&self, name: &str) -> Option<DeclId> {
        self.decls
            .get_index_of(name)
            .map(|index| DeclId::new(index as u32))
    }

    /// The name of a declaration, if the id is known.
    pub fn name(&self, id: DeclId) -> Option<&str> {
        self.decl(id).map(|d| d.name.as_str())
    }

    /// The parameter a variable reference points at, if valid.
    pub fn param(&self, var: &VariableSpec) -> Option<&TypeParam> {
        self.decl(var.decl)?.params.get(var.index)
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Whether `sub` can reach `sup` through declared supertype clauses.
    /// Reflexive; cycle-safe on malformed graphs.
    pub fn is_subdecl(&self, sub: DeclId, sup: DeclId) -> bool {
        if sub == sup {
            return true;
        }
        let mut visited = FxHashSet::default();
        let mut queue = vec![sub];
        while let Some(id) = queue.pop() {
            if !visited.insert(id) {
                continue;
            }
            if id == sup {
                return true;
            }
            if let Some(decl) = self.decl(id) {
                queue.extend(decl.supertypes.iter().filter_map(TypeSpec::head_decl));
            }
        }
        false
    }

    /// Check that every declaration reference inside `spec` resolves in this
    /// store, with arities and parameter indices consistent with what is
    /// declared. Specs built against a different store fail here.
    pub fn validate_spec(&self, spec: &TypeSpec) -> Result<(), Error> {
        match spec.kind() {
            TypeKind::Class(id) => {
                self.decl(*id).ok_or(Error::UnknownDeclaration(*id))?;
                Ok(())
            }
            TypeKind::Parameterized(p) => {
                let decl = self.decl(p.decl).ok_or(Error::UnknownDeclaration(p.decl))?;
                if decl.params.len() != p.args.len() {
                    return Err(Error::ArityMismatch {
                        decl: decl.name.clone(),
                        expected: decl.params.len(),
                        found: p.args.len(),
                    });
                }
                for arg in &p.args {
                    self.validate_spec(arg)?;
                }
                Ok(())
            }
            TypeKind::Wildcard(w) => {
                for bound in w.upper.iter().chain(&w.lower) {
                    self.validate_spec(bound)?;
                }
                Ok(())
            }
            TypeKind::Array(component) => self.validate_spec(component),
            TypeKind::Variable(v) => {
                let decl = self.decl(v.decl).ok_or(Error::UnknownDeclaration(v.decl))?;
                if v.index >= decl.params.len() {
                    return Err(Error::ParamIndexOutOfRange {
                        decl: decl.name.clone(),
                        index: v.index,
                        count: decl.params.len(),
                    });
                }
                Ok(())
            }
            TypeKind::Opaque(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_and_find() {
        let mut store = TypeStore::new();
        let list = store.declare("List", &["E"]).unwrap();
        assert_eq!(store.find("List"), Some(list));
        assert_eq!(store.name(list), Some("List"));
        assert_eq!(store.decl(list).unwrap().params.len(), 1);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut store = TypeStore::new();
        store.declare("List", &["E"]).unwrap();
        let err = store.declare("List", &[]).unwrap_err();
        assert!(matches!(err, Error::DuplicateDeclaration(name) if name == "List"));
    }

    #[test]
    fn subdecl_walks_the_supertype_graph() {
        let mut store = TypeStore::new();
        let collection = store.declare("Collection", &["E"]).unwrap();
        let list = store.declare("List", &["E"]).unwrap();
        let array_list = store.declare("ArrayList", &["E"]).unwrap();
        store
            .add_supertype(list, TypeSpec::class(collection))
            .unwrap();
        store
            .add_supertype(array_list, TypeSpec::class(list))
            .unwrap();

        assert!(store.is_subdecl(array_list, collection));
        assert!(store.is_subdecl(list, list));
        assert!(!store.is_subdecl(collection, list));
    }

    #[test]
    fn subdecl_terminates_on_cycles() {
        let mut store = TypeStore::new();
        let a = store.declare("A", &[]).unwrap();
        let b = store.declare("B", &[]).unwrap();
        let c = store.declare("C", &[]).unwrap();
        store.add_supertype(a, TypeSpec::class(b)).unwrap();
        store.add_supertype(b, TypeSpec::class(a)).unwrap();

        assert!(store.is_subdecl(a, b));
        assert!(!store.is_subdecl(a, c));
    }

    #[test]
    fn validate_rejects_foreign_specs() {
        let mut ours = TypeStore::new();
        ours.declare("Number", &[]).unwrap();

        let mut theirs = TypeStore::new();
        let a = theirs.declare("A", &[]).unwrap();
        let b = theirs.declare("B", &[]).unwrap();

        // Id 0 happens to exist in ours, id 1 does not.
        assert!(ours.validate_spec(&TypeSpec::class(a)).is_ok());
        let err = ours.validate_spec(&TypeSpec::class(b)).unwrap_err();
        assert!(matches!(err, Error::UnknownDeclaration(id) if id == b));
    }

    #[test]
    fn declarations_round_trip_through_serde() {
        let mut store = TypeStore::new();
        let number = store.declare("Number", &[]).unwrap();
        let list = store.declare("List", &["E"]).unwrap();
        let e = TypeSpec::variable(&store, list, 0).unwrap();
        store.set_param_bounds(list, 0, vec![TypeSpec::class(number)]).unwrap();
        store.add_supertype(list, TypeSpec::class(number)).unwrap();

        let json = serde_json::to_string(&store).unwrap();
        let restored: TypeStore = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.find("List"), Some(list));
        assert_eq!(restored.decl(list), store.decl(list));

        let spec = TypeSpec::parameterized(&store, list, vec![e]).unwrap();
        let json = serde_json::to_string(&spec).unwrap();
        let restored: TypeSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, spec);
    }

    #[test]
    fn self_referential_bounds_are_constructible() {
        let mut store = TypeStore::new();
        let comparable = store.declare("Comparable", &["T"]).unwrap();
        let t = TypeSpec::variable(&store, comparable, 0).unwrap();
        let bound = TypeSpec::parameterized(&store, comparable, vec![t]).unwrap();
        store.set_param_bounds(comparable, 0, vec![bound]).unwrap();

        let bounds = &store.decl(comparable).unwrap().params[0].bounds;
        assert_eq!(bounds.len(), 1);
    }
}
