//! Per-resource convenience methods on [`RcClient`].
//!
//! Every method delegates to the generic verbs with a JSON content type.
//! Callers that need YAML request bodies use the generic verbs directly.

use crate::client::{OperationOutcome, RcClient};
use crate::models::PodEvent;
use crate::Result;
use arc_core::{MediaType, ResourceType};
use serde::Serialize;

macro_rules! resource_methods {
    (
        $resource:expr, $label:literal,
        list: $list:ident,
        create: $create:ident,
        show: $show:ident,
        update: $update:ident,
        delete: $delete:ident $(,)?
    ) => {
        #[doc = concat!("List all ", $label, "s.")]
        ///
        /// # Errors
        ///
        /// See [`RcClient::list`].
        pub async fn $list(&mut self) -> Result<OperationOutcome> {
            self.list($resource).await
        }

        #[doc = concat!("Create a ", $label, ".")]
        ///
        /// # Errors
        ///
        /// See [`RcClient::create`].
        pub async fn $create<T>(&mut self, content: &T) -> Result<OperationOutcome>
        where
            T: Serialize + ?Sized,
        {
            self.create($resource, content, MediaType::Json).await
        }

        #[doc = concat!("Show one ", $label, ".")]
        ///
        /// # Errors
        ///
        /// See [`RcClient::show`].
        pub async fn $show(&mut self, uuid: &str) -> Result<OperationOutcome> {
            self.show($resource, uuid, MediaType::Json).await
        }

        #[doc = concat!("Update one ", $label, ".")]
        ///
        /// # Errors
        ///
        /// See [`RcClient::update`].
        pub async fn $update<T>(&mut self, uuid: &str, content: &T) -> Result<OperationOutcome>
        where
            T: Serialize + ?Sized,
        {
            self.update($resource, uuid, content, MediaType::Json, None)
                .await
        }

        #[doc = concat!("Delete one ", $label, ".")]
        ///
        /// # Errors
        ///
        /// See [`RcClient::delete`].
        pub async fn $delete(&mut self, uuid: &str) -> Result<OperationOutcome> {
            self.delete($resource, uuid, MediaType::Json, false).await
        }
    };
}

impl RcClient {
    /// Show the login details of the current session.
    ///
    /// # Errors
    ///
    /// See [`RcClient::list`].
    pub async fn list_login(&mut self) -> Result<OperationOutcome> {
        self.list(ResourceType::Login).await
    }

    /// Show controller version information.
    ///
    /// # Errors
    ///
    /// See [`RcClient::list`].
    pub async fn list_versions(&mut self) -> Result<OperationOutcome> {
        self.list(ResourceType::Version).await
    }

    resource_methods!(
        ResourceType::Blueprint, "blueprint",
        list: list_blueprints,
        create: create_blueprint,
        show: show_blueprint,
        update: update_blueprint,
        delete: delete_blueprint,
    );

    resource_methods!(
        ResourceType::Edgesite, "edgesite",
        list: list_edgesites,
        create: create_edgesite,
        show: show_edgesite,
        update: update_edgesite,
        delete: delete_edgesite,
    );

    resource_methods!(
        ResourceType::Hardware, "hardware profile",
        list: list_hardware,
        create: create_hardware,
        show: show_hardware,
        update: update_hardware,
        delete: delete_hardware,
    );

    resource_methods!(
        ResourceType::Node, "node",
        list: list_nodes,
        create: create_node,
        show: show_node,
        update: update_node,
        delete: delete_node,
    );

    resource_methods!(
        ResourceType::Pod, "POD",
        list: list_pods,
        create: create_pod,
        show: show_pod,
        update: update_pod,
        delete: delete_pod,
    );

    resource_methods!(
        ResourceType::Region, "region",
        list: list_regions,
        create: create_region,
        show: show_region,
        update: update_region,
        delete: delete_region,
    );

    resource_methods!(
        ResourceType::User, "user",
        list: list_users,
        create: create_user,
        show: show_user,
        update: update_user,
        delete: delete_user,
    );

    /// Update a POD and start the named workflow:
    /// `PUT /api/v1/pod/{uuid}/{workflow}`.
    ///
    /// # Errors
    ///
    /// See [`RcClient::update`].
    pub async fn update_pod_workflow<T>(
        &mut self,
        uuid: &str,
        content: &T,
        workflow: &str,
    ) -> Result<OperationOutcome>
    where
        T: Serialize + ?Sized,
    {
        self.update(ResourceType::Pod, uuid, content, MediaType::Json, Some(workflow))
            .await
    }

    /// Delete a POD even if its workflow has not finished:
    /// `DELETE /api/v1/pod/{uuid}/force`.
    ///
    /// # Errors
    ///
    /// See [`RcClient::delete`].
    pub async fn force_delete_pod(&mut self, uuid: &str) -> Result<OperationOutcome> {
        self.delete(ResourceType::Pod, uuid, MediaType::Json, true)
            .await
    }

    /// Record an event against a POD.
    ///
    /// # Errors
    ///
    /// See [`RcClient::create`].
    pub async fn create_pod_event(&mut self, event: &PodEvent) -> Result<OperationOutcome> {
        self.create(ResourceType::PodEvent, event, MediaType::Json)
            .await
    }

    /// Fetch the events recorded against a POD.
    ///
    /// The body can be parsed with
    /// [`PodEventList::from_json`](crate::models::PodEventList::from_json)
    /// when the controller answered in JSON.
    ///
    /// # Errors
    ///
    /// See [`RcClient::show`].
    pub async fn show_pod_events(&mut self, uuid: &str) -> Result<OperationOutcome> {
        self.show(ResourceType::PodEvent, uuid, MediaType::Json).await
    }
}
