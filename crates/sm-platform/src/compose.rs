//! Renders the Docker-Compose payload embedded in a CIMI service's
//! `exec` field, via plain string-building since the substitution is
//! simple enough that pulling in a templating crate the corpus does
//! not otherwise use would not pay for itself.

use sm_types::DriverSpec;

pub fn render_compose(spec: &DriverSpec) -> String {
    let mut environment = String::new();
    for (key, value) in &spec.environment {
        environment.push_str(&format!("      - '{key}={value}'\n"));
    }

    format!(
        "version: \"3.5\"\n\
services:\n\
  sensor-driver:\n\
    image: {image}:{version}\n\
    networks:\n\
      - assigned_driver_network\n\
    environment:\n\
{environment}\
networks:\n\
  assigned_driver_network:\n\
    name: {network}\n\
    external: true\n",
        image = spec.docker_image_path,
        version = spec.docker_image_version,
        network = spec.docker_network_name,
    )
}
