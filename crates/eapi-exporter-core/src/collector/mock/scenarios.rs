//! Pre-built switch scenarios for testing.
//!
//! Responses follow the JSON shapes returned by EOS eAPI for the commands
//! the collector modules run.

use serde_json::{Value, json};

use super::switch::MockSwitch;

#[allow(dead_code)]
impl MockSwitch {
    /// Creates a healthy leaf switch answering every collector command.
    ///
    /// Includes: two front-panel ports with counters, one 4-lane port whose
    /// second lane shows up as its own transceiver entry, a loopback without
    /// counters, IPv4 and IPv6 BGP peers and two power supplies.
    pub fn typical_switch() -> Self {
        let switch = Self::new();

        switch.add_response(
            "show version",
            json!({
                "modelName": "DCS-7280SR-48C6",
                "serialNumber": "JPE17191234",
                "version": "4.28.3M",
                "systemMacAddress": "28:99:3a:00:00:01",
                "hardwareRevision": "11.02",
                "architecture": "i686",
                "memTotal": 16012300,
                "memFree": 9876500,
                "uptime": 864000.5
            }),
        );

        switch.add_response(
            "show hardware capacity",
            json!({
                "tables": [
                    {"table": "LEM", "chip": "Jericho0", "feature": "IPv4", "used": 1210,
                     "usedPercent": 0, "free": 785222, "committed": 0, "maxLimit": 786432,
                     "highWatermark": 1300},
                    {"table": "TCAM", "chip": "Jericho0", "feature": "ACL", "used": 48,
                     "usedPercent": 1, "free": 4048, "committed": 0, "maxLimit": 4096,
                     "highWatermark": 52}
                ]
            }),
        );

        let mut interfaces = serde_json::Map::new();
        interfaces.insert(
            "Ethernet1/1".into(),
            ethernet("Ethernet1/1", "uplink spine1", "connected", "up", 10_000_000_000u64),
        );
        interfaces.insert(
            "Ethernet2/1".into(),
            ethernet("Ethernet2/1", "", "disabled", "down", 10_000_000_000u64),
        );
        interfaces.insert(
            "Ethernet3/1".into(),
            ethernet("Ethernet3/1", "uplink spine2", "connected", "up", 100_000_000_000u64),
        );
        interfaces.insert(
            "Loopback0".into(),
            json!({
                "name": "Loopback0",
                "description": "router-id",
                "interfaceStatus": "connected",
                "lineProtocolStatus": "up",
                "bandwidth": 0,
                "mtu": 65535
            }),
        );
        switch.add_response("show interfaces", json!({ "interfaces": interfaces }));

        switch.add_response(
            "show interfaces transceiver detail",
            json!({
                "interfaces": {
                    "Ethernet1/1": transceiver("10GBASE-SR", "XCVR-A1", -2.1, 6.5, -1.2, 3.29),
                    "Ethernet2/1": {},
                    "Ethernet3/1": transceiver("100GBASE-SR4", "XCVR-C3", -1.5, 7.0, 1.5, 3.30),
                    "Ethernet3/2": transceiver("100GBASE-SR4", "XCVR-C3", -15.0, 7.0, -0.5, 3.30)
                }
            }),
        );

        switch.add_response(
            "show ip bgp summary",
            json!({
                "vrfs": {
                    "default": {
                        "routerId": "10.0.0.1",
                        "asn": "65000",
                        "peers": {
                            "10.0.0.2": {"asn": "65001", "peerState": "Established",
                                         "prefixReceived": 120, "prefixAccepted": 120,
                                         "upDownTime": 1700000000.0},
                            "10.0.0.3": {"asn": 65002, "peerState": "Active",
                                         "prefixReceived": 0, "prefixAccepted": 0,
                                         "upDownTime": 1700000100.0}
                        }
                    },
                    "MGMT": {"routerId": "10.1.0.1", "asn": "65000"}
                }
            }),
        );

        switch.add_response(
            "show ipv6 bgp summary",
            json!({
                "vrfs": {
                    "default": {
                        "routerId": "10.0.0.1",
                        "asn": "65000",
                        "peers": {
                            "fd00::2": {"asn": "65001", "peerState": "Established",
                                        "prefixReceived": 40, "prefixAccepted": 40,
                                        "upDownTime": 1700000000.0}
                        }
                    }
                }
            }),
        );

        switch.add_response(
            "show environment power",
            json!({
                "powerSupplies": {
                    "1": power_supply("ok", 0.61, 231.0, 9.6, 115.0),
                    "2": power_supply("powerLoss", 0.0, 0.0, 0.0, 0.0)
                }
            }),
        );

        switch
    }
}

fn ethernet(name: &str, description: &str, status: &str, line: &str, bandwidth: u64) -> Value {
    json!({
        "name": name,
        "description": description,
        "interfaceStatus": status,
        "lineProtocolStatus": line,
        "bandwidth": bandwidth,
        "physicalAddress": "28:99:3a:00:00:10",
        "mtu": 9214,
        "interfaceCounters": {
            "inBroadcastPkts": 12,
            "inDiscards": 0,
            "inMulticastPkts": 3456,
            "inOctets": 987654321,
            "inUcastPkts": 123456,
            "outBroadcastPkts": 7,
            "outDiscards": 1,
            "outMulticastPkts": 4321,
            "outOctets": 123456789,
            "outUcastPkts": 654321,
            "linkStatusChanges": 2,
            "inputErrorsDetail": {"runtFrames": 0, "giantFrames": 0, "fcsErrors": 0}
        }
    })
}

fn transceiver(media: &str, serial: &str, rx: f64, bias: f64, tx: f64, voltage: f64) -> Value {
    json!({
        "mediaType": media,
        "vendorSn": serial,
        "rxPower": rx,
        "txBias": bias,
        "txPower": tx,
        "voltage": voltage,
        "temperature": 31.5,
        "updateTime": 1700000000.0,
        "details": {
            "rxPower": {"highAlarm": 3.4, "highWarn": 2.4, "lowAlarm": -13.9, "lowWarn": -9.9},
            "txBias": {"highAlarm": 13.0, "highWarn": 12.0, "lowAlarm": 3.0, "lowWarn": 4.0},
            "txPower": {"highAlarm": 2.0, "highWarn": 1.0, "lowAlarm": -9.0, "lowWarn": -7.0},
            "voltage": {"highAlarm": 3.63, "highWarn": 3.46, "lowAlarm": 2.97, "lowWarn": 3.13},
            "temperature": {"highAlarm": 75.0, "highWarn": 70.0, "lowAlarm": -5.0, "lowWarn": 0.0}
        }
    })
}

fn power_supply(
    state: &str,
    in_current: f64,
    in_voltage: f64,
    out_current: f64,
    out_power: f64,
) -> Value {
    json!({
        "state": state,
        "modelName": "PWR-500AC-F",
        "capacity": 500.0,
        "inputCurrent": in_current,
        "inputVoltage": in_voltage,
        "outputCurrent": out_current,
        "outputPower": out_power,
        "uptime": 864000.0,
        "tempSensors": {
            "TempSensorP1/1": {"status": "ok", "temperature": 31.0},
            "TempSensorP1/2": {"status": "ok", "temperature": 44.5}
        },
        "fans": {
            "FanP1/1": {"status": "ok", "speed": 40}
        }
    })
}
