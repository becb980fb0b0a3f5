//! The document model produced by a parse and consumed by the renderer.
//!
//! Nodes are built bottom-up during a module scan and are never mutated once
//! returned. Member order is source order throughout.

use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FunctionDoc {
    pub name: String,

    /// The qualified owner: the module name, or `module.Class` for methods.
    pub owner: String,

    /// Markup-escaped parameter fragments, implicit `self` already elided.
    pub params: Vec<String>,

    pub docstring: Option<String>,
    pub is_method: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ClassDoc {
    pub name: String,
    pub docstring: Option<String>,

    /// Callable members only; nested classes are never included.
    pub methods: Vec<FunctionDoc>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub enum MemberDoc {
    Class(ClassDoc),
    Function(FunctionDoc),
}

impl MemberDoc {
    pub fn name(&self) -> &str {
        match self {
            Self::Class(class) => &class.name,
            Self::Function(func) => &func.name,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ModuleDoc {
    pub name: String,
    pub docstring: Option<String>,
    pub members: Vec<MemberDoc>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PackageDoc {
    pub name: String,

    /// The docstring-bearing module of the package itself (`__init__.py`).
    pub own_doc: Option<ModuleDoc>,

    pub modules: Vec<ModuleDoc>,
    pub subpackages: Vec<PackageDoc>,
}

impl PackageDoc {
    pub fn is_empty(&self) -> bool {
        self.own_doc.is_none() && self.modules.is_empty() && self.subpackages.is_empty()
    }
}
