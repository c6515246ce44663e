mod record_detail;
mod resource_list;

pub use record_detail::RecordDetailView;
pub use resource_list::ResourceListView;

use crate::api::types::{Equipment, Inbound, Outbound, Product, Rack, Room, User, Warehouse};
use crate::ui::view::{View, ViewContext};

/// Root view for a resource command name, as listed in `commands::COMMANDS`
pub fn resource_view(name: &str, ctx: &ViewContext) -> Option<Box<dyn View>> {
  let view: Box<dyn View> = match name {
    "warehouses" => Box::new(ResourceListView::<Warehouse>::new(ctx)),
    "rooms" => Box::new(ResourceListView::<Room>::new(ctx)),
    "racks" => Box::new(ResourceListView::<Rack>::new(ctx)),
    "equipment" => Box::new(ResourceListView::<Equipment>::new(ctx)),
    "products" => Box::new(ResourceListView::<Product>::new(ctx)),
    "inbound" => Box::new(ResourceListView::<Inbound>::new(ctx)),
    "outbound" => Box::new(ResourceListView::<Outbound>::new(ctx)),
    "users" => Box::new(ResourceListView::<User>::new(ctx)),
    _ => return None,
  };
  Some(view)
}
