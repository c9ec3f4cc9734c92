//! Core Regional Controller domain types.
//!
//! This module provides the resource-type enumeration and its capability table,
//! the verbs clients may apply, and the media types used for content negotiation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::client::{JSON_MEDIA_TYPE, TLS_PORT_CLASS, YAML_MEDIA_TYPE};
use crate::error::{Error, Result};

/// Resource types exposed under `/api/v1/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// Session details for the current login
    Login,
    /// POD composition templates
    Blueprint,
    /// Groups of nodes a POD can be deployed onto
    Edgesite,
    /// Hardware profiles
    Hardware,
    /// Individual machines
    Node,
    /// Points of delivery
    Pod,
    /// Workflow events recorded against a POD
    #[serde(rename = "podevent")]
    PodEvent,
    /// Regions grouping edgesites
    Region,
    /// Controller users
    User,
    /// Component version information
    Version,
}

impl ResourceType {
    /// Returns the path segment used for this resource type.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Blueprint => "blueprint",
            Self::Edgesite => "edgesite",
            Self::Hardware => "hardware",
            Self::Node => "node",
            Self::Pod => "pod",
            Self::PodEvent => "podevent",
            Self::Region => "region",
            Self::User => "user",
            Self::Version => "version",
        }
    }

    /// Returns all resource types.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Login,
            Self::Blueprint,
            Self::Edgesite,
            Self::Hardware,
            Self::Node,
            Self::Pod,
            Self::PodEvent,
            Self::Region,
            Self::User,
            Self::Version,
        ]
    }

    /// Whether the controller defines `verb` for this resource type.
    #[must_use]
    pub const fn supports(&self, verb: Verb) -> bool {
        match self {
            Self::Login | Self::Version => matches!(verb, Verb::List),
            Self::PodEvent => matches!(verb, Verb::Create | Verb::Show),
            Self::Blueprint
            | Self::Edgesite
            | Self::Hardware
            | Self::Node
            | Self::Pod
            | Self::Region
            | Self::User => true,
        }
    }

    /// Whether `DELETE .../{id}/force` is defined.
    #[must_use]
    pub const fn supports_force_delete(&self) -> bool {
        matches!(self, Self::Pod)
    }

    /// Whether `PUT .../{id}/{subresource}` is defined.
    #[must_use]
    pub const fn supports_subresource(&self) -> bool {
        matches!(self, Self::Pod)
    }
}

impl FromStr for ResourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "login" => Ok(Self::Login),
            "blueprint" => Ok(Self::Blueprint),
            "edgesite" => Ok(Self::Edgesite),
            "hardware" => Ok(Self::Hardware),
            "node" => Ok(Self::Node),
            "pod" => Ok(Self::Pod),
            "podevent" => Ok(Self::PodEvent),
            "region" => Ok(Self::Region),
            "user" => Ok(Self::User),
            "version" => Ok(Self::Version),
            _ => Err(Error::InvalidRequest(format!("Unknown resource type: {s}"))),
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The generic operations a client can apply to a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `GET /api/v1/{type}`
    List,
    /// `POST /api/v1/{type}`
    Create,
    /// `GET /api/v1/{type}/{id}`
    Show,
    /// `PUT /api/v1/{type}/{id}`
    Update,
    /// `DELETE /api/v1/{type}/{id}`
    Delete,
}

impl Verb {
    /// Returns the verb name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Show => "show",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Which generation of the controller API a client targets.
///
/// Older deployments shipped a client without session listing or forced POD
/// deletion. `Legacy` refuses those operations locally instead of letting the
/// server reject them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilitySet {
    /// Every operation in the resource capability table
    #[default]
    Full,
    /// The reduced set of the older client
    Legacy,
}

impl CapabilitySet {
    /// Fail with [`Error::UnsupportedOperation`] unless `verb` is allowed on `resource`.
    ///
    /// # Errors
    ///
    /// Returns an error for combinations outside the capability table.
    pub fn check(self, resource: ResourceType, verb: Verb) -> Result<()> {
        if !resource.supports(verb) {
            return Err(Error::UnsupportedOperation(format!(
                "`{verb}` is not defined for resource type `{resource}`"
            )));
        }
        if self == Self::Legacy && resource == ResourceType::Login && verb == Verb::List {
            return Err(Error::UnsupportedOperation(
                "listing login details is not available with the legacy capability set"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Fail unless forced deletion is allowed on `resource`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource type, or this capability set, has no forced delete.
    pub fn check_force_delete(self, resource: ResourceType) -> Result<()> {
        if !resource.supports_force_delete() {
            return Err(Error::UnsupportedOperation(format!(
                "forced delete is not defined for resource type `{resource}`"
            )));
        }
        if self == Self::Legacy {
            return Err(Error::UnsupportedOperation(
                "forced delete is not available with the legacy capability set".to_string(),
            ));
        }
        Ok(())
    }

    /// Fail unless an update subresource is allowed on `resource`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource type has no update subresources.
    pub fn check_subresource(self, resource: ResourceType) -> Result<()> {
        if resource.supports_subresource() {
            Ok(())
        } else {
            Err(Error::UnsupportedOperation(format!(
                "update subresources are not defined for resource type `{resource}`"
            )))
        }
    }
}

/// Representations the controller can produce and consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// `application/json`
    #[default]
    Json,
    /// `application/yaml`
    Yaml,
}

impl MediaType {
    /// Returns the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => JSON_MEDIA_TYPE,
            Self::Yaml => YAML_MEDIA_TYPE,
        }
    }
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" | JSON_MEDIA_TYPE => Ok(Self::Json),
            "yaml" | "yml" | YAML_MEDIA_TYPE => Ok(Self::Yaml),
            _ => Err(Error::InvalidRequest(format!("Unknown media type: {s}"))),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering of the media types advertised in the `Accept` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptPreference {
    /// `application/json, application/yaml`
    #[default]
    JsonFirst,
    /// `application/yaml, application/json`
    YamlFirst,
}

impl AcceptPreference {
    /// Returns the `Accept` header value.
    #[must_use]
    pub const fn header_value(&self) -> &'static str {
        match self {
            Self::JsonFirst => "application/json, application/yaml",
            Self::YamlFirst => "application/yaml, application/json",
        }
    }
}

/// URL scheme used to reach the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP
    Http,
    /// HTTP over TLS
    Https,
}

impl Scheme {
    /// Derive the scheme from a port: TLS for every port congruent to 443 modulo 1000
    /// (443, 8443, 9443, ...), plain HTTP otherwise.
    #[must_use]
    pub const fn for_port(port: u16) -> Self {
        if port % 1000 == TLS_PORT_CLASS {
            Self::Https
        } else {
            Self::Http
        }
    }

    /// Returns the scheme name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_names_round_trip() {
        for resource in ResourceType::all() {
            let parsed: ResourceType = resource.name().parse().unwrap();
            assert_eq!(parsed, *resource);
        }
        assert_eq!("POD".parse::<ResourceType>().unwrap(), ResourceType::Pod);
    }

    #[test]
    fn test_resource_type_unknown() {
        let err = "widget".parse::<ResourceType>().unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn test_resource_type_serde_names() {
        let json = serde_json::to_string(&ResourceType::PodEvent).unwrap();
        assert_eq!(json, "\"podevent\"");
        let parsed: ResourceType = serde_json::from_str("\"edgesite\"").unwrap();
        assert_eq!(parsed, ResourceType::Edgesite);
    }

    #[test]
    fn test_capability_table() {
        assert!(ResourceType::Version.supports(Verb::List));
        assert!(!ResourceType::Version.supports(Verb::Show));
        assert!(ResourceType::Login.supports(Verb::List));
        assert!(!ResourceType::Login.supports(Verb::Create));
        assert!(ResourceType::PodEvent.supports(Verb::Create));
        assert!(!ResourceType::PodEvent.supports(Verb::Delete));
        for verb in [Verb::List, Verb::Create, Verb::Show, Verb::Update, Verb::Delete] {
            assert!(ResourceType::Region.supports(verb));
            assert!(ResourceType::Pod.supports(verb));
        }
        assert!(ResourceType::Pod.supports_force_delete());
        assert!(!ResourceType::Node.supports_force_delete());
        assert!(ResourceType::Pod.supports_subresource());
        assert!(!ResourceType::Blueprint.supports_subresource());
    }

    #[test]
    fn test_capability_set_check() {
        let full = CapabilitySet::Full;
        assert!(full.check(ResourceType::Login, Verb::List).is_ok());
        assert!(full.check_force_delete(ResourceType::Pod).is_ok());
        assert!(matches!(
            full.check(ResourceType::Version, Verb::Delete),
            Err(Error::UnsupportedOperation(_))
        ));
        assert!(matches!(
            full.check_force_delete(ResourceType::User),
            Err(Error::UnsupportedOperation(_))
        ));
        assert!(matches!(
            full.check_subresource(ResourceType::Edgesite),
            Err(Error::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_legacy_capability_gaps() {
        let legacy = CapabilitySet::Legacy;
        assert!(legacy.check(ResourceType::Login, Verb::List).is_err());
        assert!(legacy.check_force_delete(ResourceType::Pod).is_err());
        assert!(legacy.check(ResourceType::Pod, Verb::Delete).is_ok());
        assert!(legacy.check_subresource(ResourceType::Pod).is_ok());
        assert_eq!(CapabilitySet::default(), CapabilitySet::Full);
    }

    #[test]
    fn test_media_type_parsing() {
        assert_eq!("json".parse::<MediaType>().unwrap(), MediaType::Json);
        assert_eq!(
            "application/yaml".parse::<MediaType>().unwrap(),
            MediaType::Yaml
        );
        assert_eq!("YML".parse::<MediaType>().unwrap(), MediaType::Yaml);
        assert!("text/plain".parse::<MediaType>().is_err());
        assert_eq!(MediaType::Json.to_string(), "application/json");
    }

    #[test]
    fn test_accept_preference_header() {
        assert_eq!(
            AcceptPreference::default().header_value(),
            "application/json, application/yaml"
        );
        assert_eq!(
            AcceptPreference::YamlFirst.header_value(),
            "application/yaml, application/json"
        );
    }

    #[test]
    fn test_scheme_for_port() {
        assert_eq!(Scheme::for_port(443), Scheme::Https);
        assert_eq!(Scheme::for_port(8443), Scheme::Https);
        assert_eq!(Scheme::for_port(9443), Scheme::Https);
        assert_eq!(Scheme::for_port(8080), Scheme::Http);
        assert_eq!(Scheme::for_port(80), Scheme::Http);
        assert_eq!(Scheme::for_port(4430), Scheme::Http);
        for port in [1u16, 442, 444, 1443, 65443, 65535] {
            let expected = if port % 1000 == 443 {
                Scheme::Https
            } else {
                Scheme::Http
            };
            assert_eq!(Scheme::for_port(port), expected);
        }
    }
}
