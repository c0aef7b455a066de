//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# proxmesh configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[server]
# url = "ws://localhost:2567"
# room = "myoffice"
# connect_timeout_secs = 15     # 1-120
# heartbeat_interval_secs = 25  # 5-300

[proximity]
# threshold = 200.0             # 1-10000 world units
# sweep_interval_ms = 16        # 1-1000

[movement]
# spawn_x = 800.0
# spawn_y = 800.0
# speed = 200.0                 # 1-2000 units per second
# idle_keepalive_ms = 0         # 0 = only send on change, otherwise 100-60000

[media]
# audio = true
# video = true
# stream_label = "local"

[logging]
# level = "info"                # debug, info, warn, error
# format = "pretty"             # pretty, json
"##
    .to_string()
}
