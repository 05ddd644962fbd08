//! End-to-end conversion from files on disk to exported text

use flatxml::{
    read_path, simplify_header, unwrap_all, DelimitedWriter, FlattenConfig, JsonLinesWriter,
    LookupTable, P7mUnwrapper, XmlConverter,
};
use std::fs;

const INVOICE_ONE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<p:FatturaElettronica xmlns:p="http://ivaservizi.agenziaentrate.gov.it/docs/xsd/fatture/v1.2" versione="FPR12">
  <FatturaElettronicaHeader>
    <DatiTrasmissione>
      <IdTrasmittente><IdPaese>IT</IdPaese><IdCodice>01234567890</IdCodice></IdTrasmittente>
      <ProgressivoInvio>00001</ProgressivoInvio>
    </DatiTrasmissione>
  </FatturaElettronicaHeader>
  <FatturaElettronicaBody>
    <DatiGenerali>
      <DatiGeneraliDocumento><Numero>1</Numero><Data>2024-01-31</Data></DatiGeneraliDocumento>
    </DatiGenerali>
    <DatiBeniServizi>
      <DettaglioLinee><NumeroLinea>1</NumeroLinea><Descrizione>Bolts</Descrizione></DettaglioLinee>
      <DettaglioLinee><NumeroLinea>2</NumeroLinea><Descrizione>Nuts &amp; washers</Descrizione></DettaglioLinee>
    </DatiBeniServizi>
  </FatturaElettronicaBody>
</p:FatturaElettronica>
"#;

const INVOICE_TWO: &str = r#"<FatturaElettronica>
  <FatturaElettronicaHeader>
    <DatiTrasmissione>
      <IdTrasmittente><IdPaese>DE</IdPaese></IdTrasmittente>
    </DatiTrasmissione>
  </FatturaElettronicaHeader>
  <FatturaElettronicaBody>
    <DatiGenerali>
      <DatiGeneraliDocumento><Numero>2</Numero></DatiGeneraliDocumento>
    </DatiGenerali>
  </FatturaElettronicaBody>
</FatturaElettronica>
"#;

/// Definite-length DER element
fn der(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    let len = content.len();
    if len < 0x80 {
        out.push(len as u8);
    } else {
        out.push(0x82);
        out.extend_from_slice(&(len as u16).to_be_bytes());
    }
    out.extend_from_slice(content);
    out
}

/// A PKCS#7 signedData envelope embedding `payload`, without signer infos
fn signed_envelope(payload: &[u8]) -> Vec<u8> {
    let data_oid = der(0x06, &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x07, 0x01]);
    let signed_oid = der(0x06, &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x07, 0x02]);

    let encapsulated = der(0x30, &[data_oid, der(0xA0, &der(0x04, payload))].concat());
    let signed_data = der(
        0x30,
        &[der(0x02, &[1]), der(0x31, &[]), encapsulated, der(0x31, &[])].concat(),
    );
    der(0x30, &[signed_oid, der(0xA0, &signed_data)].concat())
}

#[test]
fn test_directory_to_csv() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("IT01_0001.xml"), INVOICE_ONE).unwrap();
    fs::write(dir.path().join("IT01_0002.xml"), INVOICE_TWO).unwrap();
    fs::write(dir.path().join("readme.txt"), "ignored").unwrap();

    let sources = read_path(dir.path(), &[".xml"]).unwrap();
    assert_eq!(sources.len(), 2);

    let config = FlattenConfig::default().with_starting_with("FatturaElettronicaBody");
    let table = XmlConverter::new(sources, config).unwrap().convert().unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.header_depth(), 4);
    assert_eq!(
        table.get(
            "IT01_0001",
            &["FatturaElettronicaBody", "DatiGenerali", "DatiGeneraliDocumento", "Numero"]
        ),
        Some("1")
    );
    assert_eq!(
        table.get(
            "IT01_0001",
            &["FatturaElettronicaBody", "DatiBeniServizi", "DettaglioLinee", "Descrizione"]
        ),
        Some("Bolts|Nuts & washers")
    );
    assert_eq!(
        table.get(
            "IT01_0002",
            &["FatturaElettronicaBody", "DatiBeniServizi", "DettaglioLinee", "Descrizione"]
        ),
        None
    );

    let mut writer = DelimitedWriter::new(Vec::new());
    writer.write_table(&table).unwrap();
    let csv = String::from_utf8(writer.into_inner()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 4 + 2);
    assert!(lines[0].starts_with(",FatturaElettronicaBody,"));
    assert!(lines[4].starts_with("IT01_0001,"));
    assert!(lines[5].starts_with("IT01_0002,"));
}

#[test]
fn test_signed_invoices_with_labels() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("IT01_0001.xml.p7m"),
        signed_envelope(INVOICE_ONE.as_bytes()),
    )
    .unwrap();
    fs::write(
        dir.path().join("IT01_0002.xml.p7m"),
        signed_envelope(INVOICE_TWO.as_bytes()),
    )
    .unwrap();
    fs::write(dir.path().join("IT01_0003.xml.p7m"), b"corrupted").unwrap();

    let envelopes = read_path(dir.path(), &[".p7m"]).unwrap();
    let mut failures = Vec::new();
    let mut handler = |_: &flatxml::EnvelopeError, name: &str| failures.push(name.to_string());
    let sources = unwrap_all(&envelopes, &P7mUnwrapper::new(), Some(&mut handler)).unwrap();

    assert_eq!(failures, vec!["IT01_0003.xml.p7m".to_string()]);
    assert!(sources.contains_key("IT01_0001.xml"));

    let config = FlattenConfig::default()
        .with_starting_with("FatturaElettronicaHeader")
        .with_offset(1);
    let table = XmlConverter::new(sources, config).unwrap().convert().unwrap();

    let simplified = simplify_header(&table, " ", LookupTable::fatturapa());
    assert_eq!(simplified.table.get("IT01_0001", &["Tras_Paese"]), Some("IT"));
    assert_eq!(simplified.table.get("IT01_0002", &["Tras_Paese"]), Some("DE"));
    assert_eq!(simplified.table.get("IT01_0001", &["Tras_ID"]), Some("01234567890"));
    assert_eq!(simplified.table.get("IT01_0001", &["Tras_prog"]), Some("00001"));
    assert!(simplified.unmapped.is_empty());

    let mut buffer = Vec::new();
    JsonLinesWriter::new(&mut buffer)
        .write_table(&simplified.table)
        .unwrap();
    let output = String::from_utf8(buffer).unwrap();
    assert_eq!(output.lines().count(), 2);
    assert!(output.contains(r#""Tras_Paese":"DE""#));
}
