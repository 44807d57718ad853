use thermometer_telemetry::RawFrame;
use thermometer_telemetry::sensors::sht31::{humidity_percent, temperature_fahrenheit};

#[test]
fn temperature_stays_in_range_and_is_monotonic() {
    let mut previous = f64::NEG_INFINITY;
    for raw in 0..=u16::MAX {
        let t = temperature_fahrenheit(raw);
        assert!((-49.0..=266.0).contains(&t), "raw {raw:#06x} -> {t}");
        assert!(t >= previous, "raw {raw:#06x} decreased to {t} from {previous}");
        previous = t;
    }
}

#[test]
fn humidity_stays_in_range_and_is_monotonic() {
    let mut previous = f64::NEG_INFINITY;
    for raw in 0..=u16::MAX {
        let rh = humidity_percent(raw);
        assert!((0.0..=100.0).contains(&rh), "raw {raw:#06x} -> {rh}");
        assert!(rh >= previous, "raw {raw:#06x} decreased to {rh} from {previous}");
        previous = rh;
    }
}

#[test]
fn frame_channels_are_big_endian() {
    for (msb, lsb) in [(0x00, 0x01), (0x01, 0x00), (0x66, 0x82), (0xFF, 0xFF)] {
        let frame = RawFrame::new([msb, lsb, 0xAA, lsb, msb, 0x55]);
        let raw_t = u16::from(msb) * 256 + u16::from(lsb);
        let raw_h = u16::from(lsb) * 256 + u16::from(msb);
        assert_eq!(frame.raw_temperature(), raw_t);
        assert_eq!(frame.raw_humidity(), raw_h);

        let reading = frame.reading();
        assert_eq!(reading.temperature_f, temperature_fahrenheit(raw_t));
        assert_eq!(reading.humidity_rh, humidity_percent(raw_h));
    }
}
