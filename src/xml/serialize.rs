use tracing::{debug, error};

use super::writer::XmlWriter;
use super::{TISS_NAMESPACE, XSI_NAMESPACE, schema_location};
use crate::core::*;

/// Serialize a document to UTF-8 TISS XML.
pub fn to_tiss_xml(doc: &TissDocument) -> Result<Vec<u8>, TissError> {
    let bytes = write_document(doc).inspect_err(|e| {
        error!(batch = %doc.batch.batch_number, error = %e, "TISS serialization failed");
    })?;
    debug!(
        batch = %doc.batch.batch_number,
        claims = doc.batch.claims.len(),
        bytes = bytes.len(),
        "serialized TISS document"
    );
    Ok(bytes)
}

/// Serialize a document to a TISS XML string.
pub fn to_tiss_string(doc: &TissDocument) -> Result<String, TissError> {
    let bytes = to_tiss_xml(doc)?;
    String::from_utf8(bytes).map_err(|e| TissError::Serialization(format!("XML UTF-8 error: {e}")))
}

fn write_document(doc: &TissDocument) -> Result<Vec<u8>, TissError> {
    let mut w = XmlWriter::new()?;
    let location = schema_location(&doc.version);

    w.start_element_with_attrs(
        "tiss",
        &[
            ("xmlns", TISS_NAMESPACE),
            ("xmlns:xsi", XSI_NAMESPACE),
            ("xsi:schemaLocation", location.as_str()),
        ],
    )?;
    w.text_element("versao", &doc.version)?;
    write_batch(&mut w, &doc.batch)?;
    w.end_element("tiss")?;

    Ok(w.into_bytes())
}

fn write_batch(w: &mut XmlWriter, batch: &Batch) -> Result<(), TissError> {
    w.start_element("lote")?;
    w.text_element("numeroLote", &batch.batch_number)?;
    w.text_element("dataEnvio", &batch.sent_date)?;
    w.optional_element("horaEnvio", batch.sent_time.as_deref())?;

    w.start_element("guias")?;
    for claim in &batch.claims {
        write_claim(w, claim)?;
    }
    w.end_element("guias")?;

    if let Some(total) = batch.declared_total {
        w.amount_element("valorTotalLote", total)?;
    }
    w.end_element("lote")?;
    Ok(())
}

fn write_claim(w: &mut XmlWriter, claim: &Claim) -> Result<(), TissError> {
    w.start_element("guia")?;
    write_identification(w, &claim.identification)?;

    match &claim.content {
        ClaimContent::Procedures(lines) => {
            w.start_element("procedimentos")?;
            for line in lines {
                w.start_element("procedimento")?;
                write_service_line(w, line)?;
                w.end_element("procedimento")?;
            }
            w.end_element("procedimentos")?;
        }
        ClaimContent::Dental(lines) => {
            w.start_element("odonto")?;
            for line in lines {
                w.start_element("procedimento")?;
                write_service_line(w, &line.service)?;
                w.optional_element("dente", line.tooth.as_deref())?;
                // Codes are accepted in any case and written upper-case.
                let face = line.face.as_deref().map(str::to_ascii_uppercase);
                let arch = line.arch.as_deref().map(str::to_ascii_uppercase);
                w.optional_element("face", face.as_deref())?;
                w.optional_element("arcada", arch.as_deref())?;
                w.end_element("procedimento")?;
            }
            w.end_element("odonto")?;
        }
        ClaimContent::AncillaryExam(lines) => {
            w.start_element("sadt")?;
            for line in lines {
                w.start_element("procedimento")?;
                write_service_line(w, &line.service)?;
                w.optional_element("tipoExame", line.exam_type.as_deref())?;
                w.optional_element("localExecucao", line.location.as_deref())?;
                w.end_element("procedimento")?;
            }
            w.end_element("sadt")?;
        }
    }

    w.amount_element("valorTotalGuia", claim.declared_total)?;
    w.optional_element("observacao", claim.note.as_deref())?;
    w.end_element("guia")?;
    Ok(())
}

fn write_identification(w: &mut XmlWriter, id: &Identification) -> Result<(), TissError> {
    w.start_element("identificacao")?;

    let p = &id.provider;
    w.start_element("prestador")?;
    w.text_element("cnpj", &p.tax_id)?;
    w.text_element("nome", &p.legal_name)?;
    w.optional_element("codigoPrestador", p.provider_code.as_deref())?;
    w.optional_element("cnes", p.facility_code.as_deref())?;
    w.end_element("prestador")?;

    let o = &id.payer;
    w.start_element("operadora")?;
    w.text_element("cnpj", &o.tax_id)?;
    w.text_element("nome", &o.legal_name)?;
    w.text_element("registroANS", &o.registration)?;
    w.end_element("operadora")?;

    let b = &id.beneficiary;
    w.start_element("beneficiario")?;
    w.text_element("numeroCarteira", &b.card_number)?;
    w.text_element("nome", &b.full_name)?;
    w.text_element("cpf", &b.tax_id)?;
    w.text_element("dataNascimento", &b.birth_date)?;
    w.text_element("sexo", &b.sex)?;
    w.text_element("nomePlano", &b.plan_name)?;
    w.optional_element("validadeCarteira", b.card_validity.as_deref())?;
    w.end_element("beneficiario")?;

    let c = &id.contractor;
    w.start_element("contratado")?;
    w.text_element("cpf", &c.tax_id)?;
    w.text_element("nome", &c.full_name)?;
    w.text_element("cbo", &c.occupation_code)?;
    w.optional_element("crm", c.license_number.as_deref())?;
    w.optional_element("conselho", c.council.as_deref())?;
    w.optional_element("ufConselho", c.council_state.as_deref())?;
    w.end_element("contratado")?;

    w.text_element("dataEmissao", &id.issue_date)?;
    w.text_element("numeroGuia", &id.claim_number)?;
    w.text_element("tipoGuia", id.kind.code())?;
    w.optional_element("dataAutorizacao", id.authorization_date.as_deref())?;
    w.optional_element("senha", id.authorization_password.as_deref())?;
    w.optional_element("numeroGuiaOrigem", id.origin_claim_number.as_deref())?;

    w.end_element("identificacao")?;
    Ok(())
}

fn write_service_line(w: &mut XmlWriter, line: &ServiceLine) -> Result<(), TissError> {
    w.text_element("codigoTabela", &line.table_code)?;
    w.text_element("codigoProcedimento", &line.procedure_code)?;
    w.text_element("descricaoProcedimento", &line.description)?;
    w.text_element("quantidadeExecutada", &line.quantity.to_string())?;
    w.amount_element("valorUnitario", line.unit_price)?;
    w.amount_element("valorTotal", line.line_total)?;
    w.text_element("dataExecucao", &line.performed_date)?;
    w.optional_element("horaInicio", line.start_time.as_deref())?;
    w.optional_element("horaFim", line.end_time.as_deref())?;
    Ok(())
}
