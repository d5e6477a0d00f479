use super::{CommandResult, Runtime};

pub fn run(runtime: &Runtime, json_output: bool) -> CommandResult {
    let products = runtime.dataset.catalog.products();

    if json_output {
        return match serde_json::to_string_pretty(products) {
            Ok(output) => CommandResult::rendered(output),
            Err(error) => CommandResult::failure("products", "serialization", error.to_string(), 1),
        };
    }

    match runtime.renderer().and_then(|renderer| renderer.products(products)) {
        Ok(output) => CommandResult::rendered(output),
        Err(error) => CommandResult::render_failure("products", error),
    }
}
