use crate::metadata::{
    controller_base_url, controller_description, extract_routes, join_paths, service_description,
};
use crate::module::ModuleDescriptor;
use crate::routing::RouteDescriptor;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use strum_macros::{Display, EnumString};

/// Level of a node in the dependency tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NodeKind {
    Root,
    Module,
    Service,
    Controller,
    Route,
}

impl NodeKind {
    fn icon(self) -> &'static str {
        match self {
            NodeKind::Root => "🏠",
            NodeKind::Module => "📦",
            NodeKind::Service => "⚙️",
            NodeKind::Controller => "🎮",
            NodeKind::Route => "🛣️",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            data: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    fn child(&self, kind: NodeKind, name: &str) -> Option<&TreeNode> {
        self.children
            .iter()
            .find(|child| child.kind == kind && child.name == name)
    }
}

/// Read-only view of modules, their services, controllers and routes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DependencyTree {
    root: TreeNode,
}

impl DependencyTree {
    /// Build the tree for `modules`, in the given order
    ///
    /// A route is `registered` when `bound` holds a route for the same
    /// controller, handler and method, and `skipped` otherwise.
    pub fn build(modules: &[Arc<ModuleDescriptor>], bound: &[RouteDescriptor]) -> Self {
        let mut root = TreeNode::new("Application", NodeKind::Root);
        root.children = modules
            .iter()
            .map(|module| module_node(module, bound))
            .collect();
        Self { root }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn find_module(&self, module: &str) -> Option<&TreeNode> {
        self.root.child(NodeKind::Module, module)
    }

    pub fn find_service(&self, module: &str, service: &str) -> Option<&TreeNode> {
        self.find_module(module)?.child(NodeKind::Service, service)
    }

    pub fn find_controller(&self, module: &str, controller: &str) -> Option<&TreeNode> {
        self.find_module(module)?.child(NodeKind::Controller, controller)
    }

    pub fn find_route(&self, module: &str, controller: &str, route: &str) -> Option<&TreeNode> {
        self.find_controller(module, controller)?
            .child(NodeKind::Route, route)
    }

    /// Names of the controllers declared by `module`
    pub fn module_dependencies(&self, module: &str) -> Vec<String> {
        self.find_module(module)
            .map(|node| {
                node.children
                    .iter()
                    .filter(|child| child.kind == NodeKind::Controller)
                    .map(|child| child.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn route_count(&self) -> usize {
        fn count(node: &TreeNode) -> usize {
            let own = usize::from(node.kind == NodeKind::Route);
            own + node.children.iter().map(count).sum::<usize>()
        }
        count(&self.root)
    }

    /// Indented, icon-prefixed text rendering
    pub fn render(&self) -> String {
        let mut out = String::new();
        render_node(&self.root, 0, &mut out);
        out
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Log the rendered tree line by line
    pub fn log(&self) {
        tracing::info!("{}", "=".repeat(60));
        tracing::info!("APPLICATION DEPENDENCY TREE");
        for line in self.render().lines() {
            tracing::info!("{line}");
        }
        tracing::info!("{}", "=".repeat(60));
    }
}

fn module_node(module: &ModuleDescriptor, bound: &[RouteDescriptor]) -> TreeNode {
    let mut node = TreeNode::new(module.name(), NodeKind::Module)
        .with("controllers", module.controllers().len())
        .with("services", module.services().len())
        .with("imports", module.imports().len());

    for service in module.services() {
        let name = service.metadata().type_name;
        node.children.push(
            TreeNode::new(name, NodeKind::Service).with("description", service_description(name)),
        );
    }

    for controller in module.controllers() {
        let metadata = controller.metadata();
        let base_url = controller_base_url(&metadata);
        let mut controller_node = TreeNode::new(metadata.type_name, NodeKind::Controller)
            .with("baseUrl", base_url.unwrap_or_default())
            .with("description", controller_description(metadata.type_name));

        if let Some(base_url) = base_url {
            controller_node.children = extract_routes(&metadata)
                .routes
                .into_iter()
                .map(|route| {
                    let registered = bound.iter().any(|descriptor| {
                        descriptor.controller == metadata.type_name
                            && descriptor.handler == route.field
                            && descriptor.method == route.method
                    });
                    TreeNode::new(route.field, NodeKind::Route)
                        .with("httpMethod", route.method.to_string())
                        .with("path", join_paths(base_url, &route.sub_path))
                        .with("handler", route.field)
                        .with("status", if registered { "registered" } else { "skipped" })
                })
                .collect();
        }

        node.children.push(controller_node);
    }

    node
}

fn render_node(node: &TreeNode, depth: usize, out: &mut String) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(node.kind.icon());
    out.push(' ');
    out.push_str(&node.name);
    if !node.data.is_empty() {
        out.push(' ');
        out.push_str(&serde_json::to_string(&node.data).unwrap_or_default());
    }
    out.push('\n');

    for child in &node.children {
        render_node(child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree() -> DependencyTree {
        let core = ModuleDescriptor::builder("CoreModule").build();
        let app = ModuleDescriptor::builder("AppModule").import(core).build();
        DependencyTree::build(&Arc::new(app).with_imports(), &[])
    }

    #[test]
    fn test_modules_become_children_of_root() {
        let tree = tree();

        assert_eq!(tree.root().kind, NodeKind::Root);
        let names: Vec<&str> =
            tree.root().children.iter().map(|node| node.name.as_str()).collect();
        assert_eq!(names, vec!["AppModule", "CoreModule"]);
        assert_eq!(tree.find_module("AppModule").unwrap().data["imports"], 1);
        assert!(tree.find_module("Missing").is_none());
        assert!(tree.module_dependencies("CoreModule").is_empty());
        assert_eq!(tree.route_count(), 0);
    }

    #[test]
    fn test_render_and_json() {
        let tree = tree();

        let rendered = tree.render();
        assert!(rendered.starts_with("🏠 Application\n"));
        assert!(rendered.contains(
            "  📦 CoreModule {\"controllers\":0,\"imports\":0,\"services\":0}\n"
        ));

        let value = tree.to_json();
        assert_eq!(value["type"], "root");
        assert_eq!(value["children"][1], json!({
            "name": "CoreModule",
            "type": "module",
            "data": { "controllers": 0, "imports": 0, "services": 0 },
        }));
    }
}
