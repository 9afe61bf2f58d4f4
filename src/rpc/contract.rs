//! Server interface surface
//!
//! The contract is fetched once from the server's IDL and used as a dispatch
//! table: every `(interface, function)` pair is resolved against it before a
//! request goes out. Parameter types are carried but never checked.

use super::error::{RpcClientError, RpcResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One top-level IDL element
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum IdlElement {
    Interface(InterfaceDef),
    Meta(MetaDef),
    #[serde(other)]
    Other,
}

/// Interface with its functions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDef {
    /// Interface name
    pub name: String,
    /// Exposed functions
    #[serde(default)]
    pub functions: Vec<FunctionDef>,
}

/// Function signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    /// Function name
    pub name: String,
    /// Declared parameters
    #[serde(default)]
    pub params: Vec<ParamDef>,
    /// Declared return type
    #[serde(default)]
    pub returns: Option<TypeRef>,
}

/// Named parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    /// Parameter name
    pub name: String,
    /// Declared type
    #[serde(flatten)]
    pub ty: TypeRef,
}

/// Type reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRef {
    /// Type name
    #[serde(rename = "type")]
    pub name: String,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct MetaDef {
    #[serde(default)]
    barrister_version: Option<String>,
    #[serde(default)]
    checksum: Option<String>,
}

/// Interfaces exposed by a server
#[derive(Debug, Clone, Default)]
pub struct Contract {
    interfaces: HashMap<String, InterfaceDef>,
    checksum: Option<String>,
    version: Option<String>,
}

impl Contract {
    /// Decode the IDL returned by the server
    pub fn from_idl(idl: Value) -> RpcResult<Self> {
        let elements: Vec<IdlElement> = serde_json::from_value(idl)?;

        let mut contract = Self::default();
        for element in elements {
            match element {
                IdlElement::Interface(iface) => contract.add_interface(iface),
                IdlElement::Meta(meta) => {
                    contract.checksum = meta.checksum;
                    contract.version = meta.barrister_version;
                }
                IdlElement::Other => {}
            }
        }
        Ok(contract)
    }

    /// Add or replace an interface
    pub fn add_interface(&mut self, iface: InterfaceDef) {
        self.interfaces.insert(iface.name.clone(), iface);
    }

    /// Add a function, creating its interface if needed
    pub fn add_function(&mut self, interface: &str, function: FunctionDef) {
        let iface = self
            .interfaces
            .entry(interface.to_string())
            .or_insert_with(|| InterfaceDef {
                name: interface.to_string(),
                functions: Vec::new(),
            });
        iface.functions.retain(|f| f.name != function.name);
        iface.functions.push(function);
    }

    /// Look up `interface.function`
    pub fn resolve(&self, interface: &str, function: &str) -> RpcResult<&FunctionDef> {
        let iface = self
            .interfaces
            .get(interface)
            .ok_or_else(|| RpcClientError::UnknownInterface(interface.to_string()))?;
        iface
            .functions
            .iter()
            .find(|f| f.name == function)
            .ok_or_else(|| RpcClientError::UnknownFunction {
                interface: interface.to_string(),
                function: function.to_string(),
            })
    }

    /// Interface names, sorted
    pub fn interface_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.interfaces.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Total number of functions across interfaces
    pub fn function_count(&self) -> usize {
        self.interfaces.values().map(|i| i.functions.len()).sum()
    }

    /// IDL checksum, when the server publishes one
    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    /// IDL generator version
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}
