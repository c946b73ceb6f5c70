fn main() {
    // NodeConfig::default() bakes these in via option_env!.
    for var in ["GREENHOUSE_ID", "WIFI_SSID", "WIFI_PASSWORD", "MQTT_BROKER"] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
